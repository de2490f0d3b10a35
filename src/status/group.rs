use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityType, Lifecycle, PackageStatus, Phase, StatusColor, StatusMetadata};
use crate::error::UnknownStatus;

/// Where a shipment group (a batch of consolidated packages) is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Draft,
    PendingConfirmation,
    Confirmed,
    Assigned,
    Loading,
    Dispatched,
    InTransit,
    Delivering,
    Completed,
    Delayed,
    Cancelled,
    Exception,
    Returned,
}

const ALL: [GroupStatus; 13] = [
    GroupStatus::Draft,
    GroupStatus::PendingConfirmation,
    GroupStatus::Confirmed,
    GroupStatus::Assigned,
    GroupStatus::Loading,
    GroupStatus::Dispatched,
    GroupStatus::InTransit,
    GroupStatus::Delivering,
    GroupStatus::Completed,
    GroupStatus::Delayed,
    GroupStatus::Cancelled,
    GroupStatus::Exception,
    GroupStatus::Returned,
];

impl Lifecycle for GroupStatus {
    const ENTITY: EntityType = EntityType::Group;

    fn all() -> &'static [Self] {
        &ALL
    }

    fn code(self) -> &'static str {
        match self {
            GroupStatus::Draft => "draft",
            GroupStatus::PendingConfirmation => "pending_confirmation",
            GroupStatus::Confirmed => "confirmed",
            GroupStatus::Assigned => "assigned",
            GroupStatus::Loading => "loading",
            GroupStatus::Dispatched => "dispatched",
            GroupStatus::InTransit => "in_transit",
            GroupStatus::Delivering => "delivering",
            GroupStatus::Completed => "completed",
            GroupStatus::Delayed => "delayed",
            GroupStatus::Cancelled => "cancelled",
            GroupStatus::Exception => "exception",
            GroupStatus::Returned => "returned",
        }
    }

    fn metadata(self) -> StatusMetadata {
        match self {
            GroupStatus::Draft => StatusMetadata {
                label: "Draft",
                description: "Group is being assembled",
                phase: Phase::Grouping,
                color: StatusColor::Gray,
                terminal: false,
                requires_action: true,
                customer_visible: false,
                typical_duration_hours: Some(24),
            },
            GroupStatus::PendingConfirmation => StatusMetadata {
                label: "Pending Confirmation",
                description: "Waiting for a manager to confirm the group contents",
                phase: Phase::Grouping,
                color: StatusColor::Yellow,
                terminal: false,
                requires_action: true,
                customer_visible: false,
                typical_duration_hours: Some(8),
            },
            GroupStatus::Confirmed => StatusMetadata {
                label: "Confirmed",
                description: "Contents confirmed, awaiting vehicle and driver",
                phase: Phase::Grouping,
                color: StatusColor::Blue,
                terminal: false,
                requires_action: true,
                customer_visible: false,
                typical_duration_hours: Some(12),
            },
            GroupStatus::Assigned => StatusMetadata {
                label: "Assigned",
                description: "Vehicle and driver assigned",
                phase: Phase::Shipping,
                color: StatusColor::Indigo,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(12),
            },
            GroupStatus::Loading => StatusMetadata {
                label: "Loading",
                description: "Packages are being loaded onto the vehicle",
                phase: Phase::Shipping,
                color: StatusColor::Indigo,
                terminal: false,
                requires_action: true,
                customer_visible: false,
                typical_duration_hours: Some(2),
            },
            GroupStatus::Dispatched => StatusMetadata {
                label: "Dispatched",
                description: "Vehicle has left the warehouse",
                phase: Phase::Shipping,
                color: StatusColor::Purple,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(2),
            },
            GroupStatus::InTransit => StatusMetadata {
                label: "In Transit",
                description: "On the way to the delivery area",
                phase: Phase::Shipping,
                color: StatusColor::Purple,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(72),
            },
            GroupStatus::Delivering => StatusMetadata {
                label: "Delivering",
                description: "Driver is delivering packages to recipients",
                phase: Phase::Shipping,
                color: StatusColor::Orange,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(12),
            },
            GroupStatus::Completed => StatusMetadata {
                label: "Completed",
                description: "Every package in the group has been delivered",
                phase: Phase::Shipping,
                color: StatusColor::Green,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
            GroupStatus::Delayed => StatusMetadata {
                label: "Delayed",
                description: "Group is behind its expected schedule",
                phase: Phase::Exception,
                color: StatusColor::Orange,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(24),
            },
            GroupStatus::Cancelled => StatusMetadata {
                label: "Cancelled",
                description: "Group was cancelled before completion",
                phase: Phase::Exception,
                color: StatusColor::Gray,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
            GroupStatus::Exception => StatusMetadata {
                label: "Exception",
                description: "Group needs manual intervention",
                phase: Phase::Exception,
                color: StatusColor::Red,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(24),
            },
            GroupStatus::Returned => StatusMetadata {
                label: "Returned",
                description: "Group was returned to the warehouse or sender",
                phase: Phase::Exception,
                color: StatusColor::Red,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
        }
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GroupStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| UnknownStatus {
            kind: Self::KIND,
            code: s.to_string(),
        })
    }
}

/// Group status equivalent to a single package status.
///
/// Every package status maps to exactly one group status.
pub fn group_status_for(status: PackageStatus) -> GroupStatus {
    match status {
        PackageStatus::Pending | PackageStatus::Received => GroupStatus::Draft,
        PackageStatus::Processing | PackageStatus::ReadyForGrouping => {
            GroupStatus::PendingConfirmation
        }
        PackageStatus::Grouped => GroupStatus::Confirmed,
        PackageStatus::Dispatched => GroupStatus::Dispatched,
        PackageStatus::InTransit => GroupStatus::InTransit,
        PackageStatus::OutForDelivery => GroupStatus::Delivering,
        PackageStatus::Delivered => GroupStatus::Completed,
        PackageStatus::Delayed => GroupStatus::Delayed,
        PackageStatus::OnHold | PackageStatus::Damaged | PackageStatus::Lost => {
            GroupStatus::Exception
        }
        PackageStatus::Returned => GroupStatus::Returned,
        PackageStatus::Cancelled => GroupStatus::Cancelled,
    }
}

/// Group status implied by the statuses of its member packages.
///
/// While any member is still moving, a held or damaged member puts the group in
/// `Exception`, a delayed member puts it in `Delayed`, and otherwise the
/// least-advanced member decides. Once every member is terminal, a shared status
/// maps directly; a mix completes if anything was delivered.
pub fn aggregate_group_status(members: &[PackageStatus]) -> Option<GroupStatus> {
    let first = *members.first()?;

    let active: Vec<PackageStatus> = members
        .iter()
        .copied()
        .filter(|s| !s.is_terminal())
        .collect();

    if !active.is_empty() {
        if active
            .iter()
            .any(|s| matches!(s, PackageStatus::OnHold | PackageStatus::Damaged))
        {
            return Some(GroupStatus::Exception);
        }
        if active.contains(&PackageStatus::Delayed) {
            return Some(GroupStatus::Delayed);
        }
        return active.iter().copied().min().map(group_status_for);
    }

    if members.iter().all(|s| *s == first) {
        return Some(group_status_for(first));
    }
    if members.contains(&PackageStatus::Delivered) {
        Some(GroupStatus::Completed)
    } else if members.contains(&PackageStatus::Returned) {
        Some(GroupStatus::Returned)
    } else {
        Some(GroupStatus::Exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_codes_parse() {
        for status in GroupStatus::all() {
            assert_eq!(status.code().parse::<GroupStatus>(), Ok(*status));
        }
        assert!("shipped".parse::<GroupStatus>().is_err());
    }

    #[test]
    fn test_group_status_for_core_path() {
        assert_eq!(group_status_for(PackageStatus::Pending), GroupStatus::Draft);
        assert_eq!(group_status_for(PackageStatus::Grouped), GroupStatus::Confirmed);
        assert_eq!(group_status_for(PackageStatus::OutForDelivery), GroupStatus::Delivering);
        assert_eq!(group_status_for(PackageStatus::Delivered), GroupStatus::Completed);
        assert_eq!(group_status_for(PackageStatus::Lost), GroupStatus::Exception);
    }

    #[test]
    fn test_terminal_packages_map_to_terminal_or_exception_groups() {
        for status in PackageStatus::all().iter().filter(|s| s.is_terminal()) {
            let group = group_status_for(*status);
            assert!(group.is_terminal() || group == GroupStatus::Exception, "{status} -> {group}");
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate_group_status(&[]), None);
    }

    #[test]
    fn test_aggregate_least_advanced_member_wins() {
        let members = [
            PackageStatus::InTransit,
            PackageStatus::Grouped,
            PackageStatus::OutForDelivery,
        ];
        assert_eq!(aggregate_group_status(&members), Some(GroupStatus::Confirmed));
    }

    #[test]
    fn test_aggregate_exceptions_dominate_active_members() {
        let delayed = [PackageStatus::InTransit, PackageStatus::Delayed];
        assert_eq!(aggregate_group_status(&delayed), Some(GroupStatus::Delayed));

        let damaged = [PackageStatus::Delayed, PackageStatus::Damaged];
        assert_eq!(aggregate_group_status(&damaged), Some(GroupStatus::Exception));
    }

    #[test]
    fn test_aggregate_terminal_members() {
        let all_delivered = [PackageStatus::Delivered, PackageStatus::Delivered];
        assert_eq!(aggregate_group_status(&all_delivered), Some(GroupStatus::Completed));

        let mixed = [PackageStatus::Delivered, PackageStatus::Returned];
        assert_eq!(aggregate_group_status(&mixed), Some(GroupStatus::Completed));

        let returned = [PackageStatus::Returned, PackageStatus::Cancelled];
        assert_eq!(aggregate_group_status(&returned), Some(GroupStatus::Returned));

        let lost = [PackageStatus::Lost, PackageStatus::Cancelled];
        assert_eq!(aggregate_group_status(&lost), Some(GroupStatus::Exception));
    }

    #[test]
    fn test_active_member_keeps_group_open() {
        let members = [PackageStatus::Delivered, PackageStatus::OutForDelivery];
        assert_eq!(aggregate_group_status(&members), Some(GroupStatus::Delivering));
    }
}
