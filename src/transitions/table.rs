// Built-in transition tables

use super::TransitionRule;
use crate::status::{GroupStatus, PackageStatus};

pub const ADMIN: &str = "admin";
pub const WAREHOUSE_MANAGER: &str = "warehouse_manager";
pub const WAREHOUSE_STAFF: &str = "warehouse_staff";
pub const DRIVER: &str = "driver";
pub const CUSTOMER_SERVICE: &str = "customer_service";
pub const SYSTEM: &str = "system";

const FLOOR: &[&str] = &[WAREHOUSE_STAFF, WAREHOUSE_MANAGER, ADMIN];
const FLOOR_AND_SYSTEM: &[&str] = &[WAREHOUSE_STAFF, WAREHOUSE_MANAGER, ADMIN, SYSTEM];
const MANAGEMENT: &[&str] = &[WAREHOUSE_MANAGER, ADMIN];
const ROAD: &[&str] = &[DRIVER, WAREHOUSE_MANAGER, ADMIN];
const ROAD_AND_SYSTEM: &[&str] = &[DRIVER, WAREHOUSE_MANAGER, ADMIN, SYSTEM];

pub const RETURN_AUTHORIZED: &str = "return_authorized";
pub const INVESTIGATION_COMPLETED: &str = "investigation_completed";
pub const DELIVERY_CODE_VERIFIED: &str = "delivery_code_verified";
pub const DAMAGE_ASSESSED: &str = "damage_assessed";
pub const GROUP_CONFIRMED: &str = "group_confirmed";
pub const VEHICLE_ASSIGNED: &str = "vehicle_assigned";
pub const DRIVER_ASSIGNED: &str = "driver_assigned";
pub const LOADING_VERIFIED: &str = "loading_verified";
pub const ALL_PACKAGES_DELIVERED: &str = "all_packages_delivered";

/// Package lifecycle edges
pub fn package_rules() -> Vec<TransitionRule<PackageStatus>> {
    use PackageStatus::*;

    vec![
        // Intake
        TransitionRule::new(Pending, Received, FLOOR_AND_SYSTEM, "Package scanned in at the dock")
            .automatic(),
        TransitionRule::new(
            Pending,
            Processing,
            FLOOR,
            "Package processed straight from announcement",
        ),
        TransitionRule::new(
            Pending,
            Cancelled,
            &[CUSTOMER_SERVICE, WAREHOUSE_MANAGER, ADMIN],
            "Sender cancelled before arrival",
        )
        .with_reason(),
        TransitionRule::new(Pending, OnHold, MANAGEMENT, "Hold announced package").with_reason(),
        TransitionRule::new(Received, Processing, FLOOR_AND_SYSTEM, "Start weighing and labelling")
            .automatic(),
        TransitionRule::new(Received, Damaged, FLOOR, "Damage found at intake").with_reason(),
        TransitionRule::new(Received, OnHold, MANAGEMENT, "Hold received package").with_reason(),
        TransitionRule::new(
            Processing,
            ReadyForGrouping,
            FLOOR_AND_SYSTEM,
            "Processing finished, queue for consolidation",
        ),
        TransitionRule::new(Processing, Damaged, FLOOR, "Damage found while processing")
            .with_reason(),
        TransitionRule::new(Processing, OnHold, FLOOR, "Hold package during processing")
            .with_reason(),
        // Grouping
        TransitionRule::new(
            ReadyForGrouping,
            Grouped,
            FLOOR_AND_SYSTEM,
            "Added to a shipment group",
        )
        .automatic(),
        TransitionRule::new(ReadyForGrouping, OnHold, MANAGEMENT, "Hold before grouping")
            .with_reason(),
        TransitionRule::new(Grouped, ReadyForGrouping, FLOOR, "Removed from its shipment group")
            .with_reason(),
        TransitionRule::new(Grouped, Dispatched, ROAD, "Left the warehouse with its group")
            .with_conditions(&[GROUP_CONFIRMED, VEHICLE_ASSIGNED]),
        TransitionRule::new(Grouped, OnHold, MANAGEMENT, "Pulled from group and held")
            .with_reason(),
        // Shipping
        TransitionRule::new(Dispatched, InTransit, &[DRIVER, SYSTEM, ADMIN], "Vehicle under way")
            .automatic(),
        TransitionRule::new(
            InTransit,
            OutForDelivery,
            &[DRIVER, SYSTEM, ADMIN],
            "Reached delivery area",
        ),
        TransitionRule::new(InTransit, Delayed, ROAD_AND_SYSTEM, "Running behind schedule")
            .automatic()
            .with_reason(),
        TransitionRule::new(InTransit, Damaged, ROAD, "Damaged in transit").with_reason(),
        TransitionRule::new(InTransit, Lost, MANAGEMENT, "Declared lost in transit")
            .with_approval()
            .with_reason()
            .with_conditions(&[INVESTIGATION_COMPLETED]),
        TransitionRule::new(OutForDelivery, Delivered, &[DRIVER, ADMIN], "Delivered to recipient")
            .with_conditions(&[DELIVERY_CODE_VERIFIED]),
        TransitionRule::new(OutForDelivery, Delayed, ROAD, "Delivery attempt failed").with_reason(),
        TransitionRule::new(OutForDelivery, Returned, ROAD, "Returned to sender from the route")
            .with_approval()
            .with_reason()
            .with_conditions(&[RETURN_AUTHORIZED]),
        // Exceptions
        TransitionRule::new(Delayed, InTransit, ROAD_AND_SYSTEM, "Back on schedule"),
        TransitionRule::new(Delayed, OutForDelivery, ROAD, "Delivery rescheduled"),
        TransitionRule::new(Delayed, Returned, MANAGEMENT, "Return delayed package to sender")
            .with_approval()
            .with_reason()
            .with_conditions(&[RETURN_AUTHORIZED]),
        TransitionRule::new(Delayed, Lost, MANAGEMENT, "Declared lost after delay")
            .with_approval()
            .with_reason()
            .with_conditions(&[INVESTIGATION_COMPLETED]),
        TransitionRule::new(Damaged, Processing, MANAGEMENT, "Repackaged and back in processing")
            .with_approval()
            .with_reason()
            .with_conditions(&[DAMAGE_ASSESSED]),
        TransitionRule::new(Damaged, Returned, MANAGEMENT, "Damaged package returned to sender")
            .with_approval()
            .with_reason()
            .with_conditions(&[DAMAGE_ASSESSED, RETURN_AUTHORIZED]),
        TransitionRule::new(OnHold, Processing, MANAGEMENT, "Hold released").with_reason(),
        TransitionRule::new(
            OnHold,
            Cancelled,
            &[CUSTOMER_SERVICE, WAREHOUSE_MANAGER, ADMIN],
            "Held package cancelled",
        )
        .with_approval()
        .with_reason(),
    ]
}

/// Shipment group lifecycle edges
pub fn group_rules() -> Vec<TransitionRule<GroupStatus>> {
    use GroupStatus::*;

    vec![
        TransitionRule::new(Draft, PendingConfirmation, FLOOR, "Submit group for confirmation"),
        TransitionRule::new(Draft, Cancelled, MANAGEMENT, "Discard draft group").with_reason(),
        TransitionRule::new(PendingConfirmation, Confirmed, MANAGEMENT, "Confirm group contents")
            .with_approval(),
        TransitionRule::new(PendingConfirmation, Draft, FLOOR, "Send group back for changes")
            .with_reason(),
        TransitionRule::new(PendingConfirmation, Cancelled, MANAGEMENT, "Cancel unconfirmed group")
            .with_reason(),
        TransitionRule::new(Confirmed, Assigned, MANAGEMENT, "Assign vehicle and driver")
            .with_conditions(&[VEHICLE_ASSIGNED, DRIVER_ASSIGNED]),
        TransitionRule::new(Confirmed, Cancelled, MANAGEMENT, "Cancel confirmed group")
            .with_approval()
            .with_reason(),
        TransitionRule::new(
            Assigned,
            Loading,
            &[WAREHOUSE_STAFF, DRIVER, WAREHOUSE_MANAGER, ADMIN],
            "Start loading the vehicle",
        ),
        TransitionRule::new(Assigned, Cancelled, MANAGEMENT, "Cancel assigned group")
            .with_approval()
            .with_reason(),
        TransitionRule::new(Loading, Dispatched, ROAD, "Vehicle leaves the warehouse")
            .with_conditions(&[LOADING_VERIFIED]),
        TransitionRule::new(Dispatched, InTransit, &[DRIVER, SYSTEM, ADMIN], "Vehicle under way")
            .automatic(),
        TransitionRule::new(
            InTransit,
            Delivering,
            &[DRIVER, SYSTEM, ADMIN],
            "Reached delivery area",
        ),
        TransitionRule::new(InTransit, Delayed, ROAD_AND_SYSTEM, "Running behind schedule")
            .automatic()
            .with_reason(),
        TransitionRule::new(InTransit, Exception, ROAD, "Incident on the road").with_reason(),
        TransitionRule::new(
            Delivering,
            Completed,
            &[DRIVER, ADMIN, SYSTEM],
            "All packages delivered",
        )
        .automatic()
        .with_conditions(&[ALL_PACKAGES_DELIVERED]),
        TransitionRule::new(Delivering, Delayed, ROAD, "Deliveries running late").with_reason(),
        TransitionRule::new(Delivering, Exception, ROAD, "Delivery incident").with_reason(),
        TransitionRule::new(Delayed, InTransit, ROAD_AND_SYSTEM, "Back on schedule"),
        TransitionRule::new(Delayed, Delivering, ROAD, "Deliveries resumed"),
        TransitionRule::new(Delayed, Exception, ROAD, "Delay escalated").with_reason(),
        TransitionRule::new(Delayed, Returned, MANAGEMENT, "Return delayed group")
            .with_approval()
            .with_reason(),
        TransitionRule::new(Exception, InTransit, MANAGEMENT, "Incident resolved")
            .with_approval()
            .with_reason(),
        TransitionRule::new(Exception, Returned, MANAGEMENT, "Return group after incident")
            .with_approval()
            .with_reason(),
        TransitionRule::new(Exception, Cancelled, &[ADMIN], "Cancel group after incident")
            .with_approval()
            .with_reason(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Lifecycle;

    #[test]
    fn test_every_non_terminal_package_status_has_an_exit() {
        let rules = package_rules();
        for status in PackageStatus::all().iter().filter(|s| !s.is_terminal()) {
            assert!(rules.iter().any(|r| r.from == *status), "{status} has no outbound rule");
        }
    }

    #[test]
    fn test_every_non_terminal_group_status_has_an_exit() {
        let rules = group_rules();
        for status in GroupStatus::all().iter().filter(|s| !s.is_terminal()) {
            assert!(rules.iter().any(|r| r.from == *status), "{status} has no outbound rule");
        }
    }

    #[test]
    fn test_every_status_is_reachable_except_entry_points() {
        let rules = package_rules();
        for status in PackageStatus::all().iter().filter(|s| **s != PackageStatus::Pending) {
            assert!(rules.iter().any(|r| r.to == *status), "{status} is unreachable");
        }
        let rules = group_rules();
        for status in GroupStatus::all().iter().filter(|s| **s != GroupStatus::Draft) {
            assert!(rules.iter().any(|r| r.to == *status), "{status} is unreachable");
        }
    }

    #[test]
    fn test_approval_edges_always_require_reason() {
        for rule in package_rules() {
            if rule.requires_approval {
                assert!(rule.requires_reason, "{} -> {}", rule.from, rule.to);
            }
        }
    }
}
