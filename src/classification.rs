use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::{GroupStatus, Lifecycle, PackageStatus};

/// Coarse bucket used for analytics grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Intake,
    Processing,
    Grouping,
    Dispatch,
    Transit,
    Delivery,
    Exception,
    Administrative,
}

/// Severity of being in a status, for prioritisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusCategory::Intake => "intake",
            StatusCategory::Processing => "processing",
            StatusCategory::Grouping => "grouping",
            StatusCategory::Dispatch => "dispatch",
            StatusCategory::Transit => "transit",
            StatusCategory::Delivery => "delivery",
            StatusCategory::Exception => "exception",
            StatusCategory::Administrative => "administrative",
        };
        write!(f, "{}", label)
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        };
        write!(f, "{}", label)
    }
}

/// Static category and impact classification of a status
pub trait Classified: Lifecycle {
    fn category(self) -> StatusCategory;

    fn impact(self) -> ImpactLevel;
}

const PACKAGE_HIGH_IMPACT: &[PackageStatus] = &[
    PackageStatus::Damaged,
    PackageStatus::Lost,
    PackageStatus::Returned,
    PackageStatus::Cancelled,
];
const PACKAGE_MEDIUM_IMPACT: &[PackageStatus] = &[PackageStatus::Delayed, PackageStatus::OnHold];

const GROUP_HIGH_IMPACT: &[GroupStatus] = &[
    GroupStatus::Exception,
    GroupStatus::Returned,
    GroupStatus::Cancelled,
];
const GROUP_MEDIUM_IMPACT: &[GroupStatus] = &[GroupStatus::Delayed];

impl Classified for PackageStatus {
    fn category(self) -> StatusCategory {
        match self {
            PackageStatus::Pending | PackageStatus::Received => StatusCategory::Intake,
            PackageStatus::Processing => StatusCategory::Processing,
            PackageStatus::ReadyForGrouping | PackageStatus::Grouped => StatusCategory::Grouping,
            PackageStatus::Dispatched => StatusCategory::Dispatch,
            PackageStatus::InTransit => StatusCategory::Transit,
            PackageStatus::OutForDelivery | PackageStatus::Delivered => StatusCategory::Delivery,
            PackageStatus::Delayed
            | PackageStatus::Damaged
            | PackageStatus::Lost
            | PackageStatus::Returned => StatusCategory::Exception,
            PackageStatus::OnHold | PackageStatus::Cancelled => StatusCategory::Administrative,
        }
    }

    fn impact(self) -> ImpactLevel {
        impact_from_sets(self, PACKAGE_HIGH_IMPACT, PACKAGE_MEDIUM_IMPACT)
    }
}

impl Classified for GroupStatus {
    fn category(self) -> StatusCategory {
        match self {
            GroupStatus::Draft | GroupStatus::PendingConfirmation | GroupStatus::Confirmed => {
                StatusCategory::Grouping
            }
            GroupStatus::Assigned | GroupStatus::Loading | GroupStatus::Dispatched => {
                StatusCategory::Dispatch
            }
            GroupStatus::InTransit => StatusCategory::Transit,
            GroupStatus::Delivering | GroupStatus::Completed => StatusCategory::Delivery,
            GroupStatus::Delayed | GroupStatus::Exception | GroupStatus::Returned => {
                StatusCategory::Exception
            }
            GroupStatus::Cancelled => StatusCategory::Administrative,
        }
    }

    fn impact(self) -> ImpactLevel {
        impact_from_sets(self, GROUP_HIGH_IMPACT, GROUP_MEDIUM_IMPACT)
    }
}

fn impact_from_sets<S: PartialEq>(status: S, high: &[S], medium: &[S]) -> ImpactLevel {
    if high.contains(&status) {
        ImpactLevel::High
    } else if medium.contains(&status) {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

pub fn determine_status_category<S: Classified>(status: S) -> StatusCategory {
    status.category()
}

pub fn determine_impact_level<S: Classified>(status: S) -> ImpactLevel {
    status.impact()
}

/// Category for a raw code from outside the typed world; unknown codes are administrative
pub fn category_for_code<S: Classified>(code: &str) -> StatusCategory {
    S::from_code(code)
        .map(Classified::category)
        .unwrap_or(StatusCategory::Administrative)
}

/// Impact for a raw code; unknown codes are low impact
pub fn impact_for_code<S: Classified>(code: &str) -> ImpactLevel {
    S::from_code(code)
        .map(Classified::impact)
        .unwrap_or(ImpactLevel::Low)
}
