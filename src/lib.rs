// Parcel Lifecycle Library - package and shipment-group status rules
// Exposes the status registry for the warehouse UI, importers and tests

pub mod classification;
pub mod config;
pub mod error;
pub mod history;
pub mod status;
pub mod telemetry;
pub mod transitions;

// Re-export key types for easy access
pub use classification::{
    category_for_code, determine_impact_level, determine_status_category, impact_for_code,
    Classified, ImpactLevel, StatusCategory,
};
pub use config::{LifecycleConfig, RegistryHandle};
pub use error::{HistoryError, RegistryError, UnknownStatus};
pub use history::{record_transition, ChangeSource, HistoryEntryBuilder, StatusHistoryEntry};
pub use status::{
    aggregate_group_status, format_status, group_status_for, EntityType, GroupStatus, Lifecycle,
    PackageStatus, Phase, StatusColor, StatusMetadata,
};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
pub use transitions::{
    group_registry, package_registry, BatchPartition, BatchValidationResult, EntitySnapshot,
    Tracked, TransitionRegistry, TransitionRule, TransitionValidation,
};
