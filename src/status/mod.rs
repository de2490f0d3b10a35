// Status vocabularies for packages and package groups

pub mod group;
pub mod package;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

pub use group::{aggregate_group_status, group_status_for, GroupStatus};
pub use package::PackageStatus;

/// Kind of entity a status space describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Package,
    Group,
}

impl EntityType {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityType::Package => "package",
            EntityType::Group => "group",
        }
    }
}

/// Lifecycle phase a status belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Intake,
    Grouping,
    Shipping,
    Exception,
}

/// Display colour bucket used by dashboards and badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Gray,
    Blue,
    Indigo,
    Purple,
    Yellow,
    Orange,
    Green,
    Red,
}

/// Fixed display and workflow metadata attached to every status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusMetadata {
    pub label: &'static str,
    pub description: &'static str,
    pub phase: Phase,
    pub color: StatusColor,
    /// No transition leaves a terminal status
    pub terminal: bool,
    pub requires_action: bool,
    pub customer_visible: bool,
    /// Typical hours spent in this status; `None` for terminal statuses
    pub typical_duration_hours: Option<u32>,
}

/// A closed status space with a transition table of its own.
///
/// Implemented by [`PackageStatus`] and [`GroupStatus`]. Metadata lookups are
/// exhaustive matches, so every value always has an entry.
pub trait Lifecycle:
    Copy
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    const ENTITY: EntityType;

    /// "package" or "group", for messages and log fields
    const KIND: &'static str = Self::ENTITY.as_str();

    /// Every status in declaration order
    fn all() -> &'static [Self];

    /// Wire code, e.g. `ready_for_grouping`
    fn code(self) -> &'static str;

    fn metadata(self) -> StatusMetadata;

    fn from_code(code: &str) -> Option<Self> {
        Self::all().iter().copied().find(|status| status.code() == code)
    }

    fn is_terminal(self) -> bool {
        self.metadata().terminal
    }

    fn label(self) -> &'static str {
        self.metadata().label
    }
}

/// Render a raw status code for display.
///
/// Known codes render as their label. Unknown codes (legacy rows, data from
/// other systems) are humanized instead of rejected.
pub fn format_status<S: Lifecycle>(raw: &str) -> String {
    let raw = raw.trim();
    match S::from_code(raw) {
        Some(status) => status.label().to_string(),
        None => humanize_code(raw),
    }
}

/// `out_for_delivery` -> `Out For Delivery`
pub fn humanize_code(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_code() {
        assert_eq!(humanize_code("out_for_delivery"), "Out For Delivery");
        assert_eq!(humanize_code("LEGACY_HOLD"), "Legacy Hold");
        assert_eq!(humanize_code("archived"), "Archived");
        assert_eq!(humanize_code("__odd__value_"), "Odd Value");
        assert_eq!(humanize_code(""), "");
    }

    #[test]
    fn test_format_status_known_and_unknown() {
        assert_eq!(format_status::<PackageStatus>("in_transit"), "In Transit");
        assert_eq!(format_status::<PackageStatus>("awaiting_pickup"), "Awaiting Pickup");
        assert_eq!(format_status::<GroupStatus>("pending_confirmation"), "Pending Confirmation");
    }

    #[test]
    fn test_format_status_ignores_surrounding_whitespace() {
        assert_eq!(format_status::<PackageStatus>(" delivered"), "Delivered");
        assert_eq!(format_status::<GroupStatus>("completed\n"), "Completed");
        assert_eq!(format_status::<PackageStatus>("  legacy_hold "), "Legacy Hold");
    }

    #[test]
    fn test_terminal_statuses_have_no_typical_duration() {
        for status in PackageStatus::all() {
            let meta = status.metadata();
            assert_eq!(meta.terminal, meta.typical_duration_hours.is_none(), "{status}");
        }
        for status in GroupStatus::all() {
            let meta = status.metadata();
            assert_eq!(meta.terminal, meta.typical_duration_hours.is_none(), "{status}");
        }
    }
}
