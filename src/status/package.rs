use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{EntityType, Lifecycle, Phase, StatusColor, StatusMetadata};
use crate::error::UnknownStatus;

/// Where a single package is in its warehouse lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Announced by the sender, not yet at the warehouse
    Pending,
    Received,
    Processing,
    ReadyForGrouping,
    Grouped,
    Dispatched,
    InTransit,
    OutForDelivery,
    Delivered,
    Delayed,
    OnHold,
    Damaged,
    Lost,
    Returned,
    Cancelled,
}

const ALL: [PackageStatus; 15] = [
    PackageStatus::Pending,
    PackageStatus::Received,
    PackageStatus::Processing,
    PackageStatus::ReadyForGrouping,
    PackageStatus::Grouped,
    PackageStatus::Dispatched,
    PackageStatus::InTransit,
    PackageStatus::OutForDelivery,
    PackageStatus::Delivered,
    PackageStatus::Delayed,
    PackageStatus::OnHold,
    PackageStatus::Damaged,
    PackageStatus::Lost,
    PackageStatus::Returned,
    PackageStatus::Cancelled,
];

impl Lifecycle for PackageStatus {
    const ENTITY: EntityType = EntityType::Package;

    fn all() -> &'static [Self] {
        &ALL
    }

    fn code(self) -> &'static str {
        match self {
            PackageStatus::Pending => "pending",
            PackageStatus::Received => "received",
            PackageStatus::Processing => "processing",
            PackageStatus::ReadyForGrouping => "ready_for_grouping",
            PackageStatus::Grouped => "grouped",
            PackageStatus::Dispatched => "dispatched",
            PackageStatus::InTransit => "in_transit",
            PackageStatus::OutForDelivery => "out_for_delivery",
            PackageStatus::Delivered => "delivered",
            PackageStatus::Delayed => "delayed",
            PackageStatus::OnHold => "on_hold",
            PackageStatus::Damaged => "damaged",
            PackageStatus::Lost => "lost",
            PackageStatus::Returned => "returned",
            PackageStatus::Cancelled => "cancelled",
        }
    }

    fn metadata(self) -> StatusMetadata {
        match self {
            PackageStatus::Pending => StatusMetadata {
                label: "Pending",
                description: "Announced by the sender and expected at the warehouse",
                phase: Phase::Intake,
                color: StatusColor::Gray,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(48),
            },
            PackageStatus::Received => StatusMetadata {
                label: "Received",
                description: "Scanned in at the warehouse dock",
                phase: Phase::Intake,
                color: StatusColor::Blue,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(4),
            },
            PackageStatus::Processing => StatusMetadata {
                label: "Processing",
                description: "Being weighed, measured and labelled",
                phase: Phase::Intake,
                color: StatusColor::Blue,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(8),
            },
            PackageStatus::ReadyForGrouping => StatusMetadata {
                label: "Ready for Grouping",
                description: "Processed and waiting to be consolidated into a shipment",
                phase: Phase::Grouping,
                color: StatusColor::Indigo,
                terminal: false,
                requires_action: true,
                customer_visible: false,
                typical_duration_hours: Some(24),
            },
            PackageStatus::Grouped => StatusMetadata {
                label: "Grouped",
                description: "Assigned to a shipment group",
                phase: Phase::Grouping,
                color: StatusColor::Purple,
                terminal: false,
                requires_action: false,
                customer_visible: false,
                typical_duration_hours: Some(24),
            },
            PackageStatus::Dispatched => StatusMetadata {
                label: "Dispatched",
                description: "Left the warehouse with its group",
                phase: Phase::Shipping,
                color: StatusColor::Yellow,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(2),
            },
            PackageStatus::InTransit => StatusMetadata {
                label: "In Transit",
                description: "On the way to the destination area",
                phase: Phase::Shipping,
                color: StatusColor::Yellow,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(72),
            },
            PackageStatus::OutForDelivery => StatusMetadata {
                label: "Out for Delivery",
                description: "With the driver for final delivery",
                phase: Phase::Shipping,
                color: StatusColor::Orange,
                terminal: false,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: Some(12),
            },
            PackageStatus::Delivered => StatusMetadata {
                label: "Delivered",
                description: "Handed to the recipient with a verified delivery code",
                phase: Phase::Shipping,
                color: StatusColor::Green,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
            PackageStatus::Delayed => StatusMetadata {
                label: "Delayed",
                description: "Behind its expected schedule",
                phase: Phase::Exception,
                color: StatusColor::Orange,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(24),
            },
            PackageStatus::OnHold => StatusMetadata {
                label: "On Hold",
                description: "Held at the warehouse pending an administrative decision",
                phase: Phase::Exception,
                color: StatusColor::Gray,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(48),
            },
            PackageStatus::Damaged => StatusMetadata {
                label: "Damaged",
                description: "Damage reported and awaiting assessment",
                phase: Phase::Exception,
                color: StatusColor::Red,
                terminal: false,
                requires_action: true,
                customer_visible: true,
                typical_duration_hours: Some(48),
            },
            PackageStatus::Lost => StatusMetadata {
                label: "Lost",
                description: "Declared lost after investigation",
                phase: Phase::Exception,
                color: StatusColor::Red,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
            PackageStatus::Returned => StatusMetadata {
                label: "Returned",
                description: "Sent back to the sender",
                phase: Phase::Exception,
                color: StatusColor::Red,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
            PackageStatus::Cancelled => StatusMetadata {
                label: "Cancelled",
                description: "Cancelled before shipping",
                phase: Phase::Exception,
                color: StatusColor::Gray,
                terminal: true,
                requires_action: false,
                customer_visible: true,
                typical_duration_hours: None,
            },
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PackageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| UnknownStatus {
            kind: Self::KIND,
            code: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for status in PackageStatus::all() {
            assert_eq!(status.code().parse::<PackageStatus>(), Ok(*status));
        }
    }

    #[test]
    fn test_serde_uses_wire_codes() {
        let json = serde_json::to_string(&PackageStatus::ReadyForGrouping).unwrap();
        assert_eq!(json, "\"ready_for_grouping\"");
        let parsed: PackageStatus = serde_json::from_str("\"out_for_delivery\"").unwrap();
        assert_eq!(parsed, PackageStatus::OutForDelivery);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = "teleported".parse::<PackageStatus>().unwrap_err();
        assert_eq!(err.code, "teleported");
        assert_eq!(err.to_string(), "Unknown package status 'teleported'");
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = PackageStatus::all()
            .iter()
            .copied()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                PackageStatus::Delivered,
                PackageStatus::Lost,
                PackageStatus::Returned,
                PackageStatus::Cancelled
            ]
        );
    }
}
