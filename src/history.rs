// Status history: immutable audit records handed to the backend for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::classification::{Classified, ImpactLevel, StatusCategory};
use crate::error::HistoryError;
use crate::status::EntityType;
use crate::transitions::TransitionRegistry;

/// What initiated a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    #[default]
    Manual,
    Automatic,
    Batch,
    System,
    Api,
}

/// One recorded status change. Fields are read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    id: Uuid,
    entity_id: String,
    entity_type: EntityType,
    previous_status: Option<String>,
    new_status: String,
    changed_at: DateTime<Utc>,
    changed_by: String,
    changed_by_role: String,
    reason: Option<String>,
    location: Option<String>,
    category: StatusCategory,
    impact: ImpactLevel,
    change_source: ChangeSource,
}

impl StatusHistoryEntry {
    pub fn builder<S: Classified>(
        entity_id: impl Into<String>,
        new_status: S,
    ) -> HistoryEntryBuilder<S> {
        HistoryEntryBuilder {
            entity_id: entity_id.into(),
            previous_status: None,
            new_status,
            actor: String::new(),
            actor_role: String::new(),
            reason: None,
            location: None,
            source: ChangeSource::default(),
            changed_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn previous_status(&self) -> Option<&str> {
        self.previous_status.as_deref()
    }

    pub fn new_status(&self) -> &str {
        &self.new_status
    }

    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    pub fn changed_by(&self) -> &str {
        &self.changed_by
    }

    pub fn changed_by_role(&self) -> &str {
        &self.changed_by_role
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn category(&self) -> StatusCategory {
        self.category
    }

    pub fn impact(&self) -> ImpactLevel {
        self.impact
    }

    pub fn change_source(&self) -> ChangeSource {
        self.change_source
    }
}

#[derive(Debug, Clone)]
pub struct HistoryEntryBuilder<S> {
    entity_id: String,
    previous_status: Option<S>,
    new_status: S,
    actor: String,
    actor_role: String,
    reason: Option<String>,
    location: Option<String>,
    source: ChangeSource,
    changed_at: Option<DateTime<Utc>>,
}

impl<S: Classified> HistoryEntryBuilder<S> {
    /// Status before the change; leave unset for the first entry of an entity
    pub fn from_status(mut self, status: S) -> Self {
        self.previous_status = Some(status);
        self
    }

    pub fn actor(mut self, actor: impl Into<String>, role: impl Into<String>) -> Self {
        self.actor = actor.into();
        self.actor_role = role.into();
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn source(mut self, source: ChangeSource) -> Self {
        self.source = source;
        self
    }

    /// Override the timestamp (defaults to now)
    pub fn at(mut self, changed_at: DateTime<Utc>) -> Self {
        self.changed_at = Some(changed_at);
        self
    }

    pub fn build(self) -> Result<StatusHistoryEntry, HistoryError> {
        if self.entity_id.trim().is_empty() {
            return Err(HistoryError::MissingEntityId);
        }
        if self.actor.trim().is_empty() {
            return Err(HistoryError::MissingActor);
        }
        if self.previous_status == Some(self.new_status) {
            return Err(HistoryError::Unchanged {
                status: self.new_status.to_string(),
            });
        }

        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            entity_id: self.entity_id,
            entity_type: S::ENTITY,
            previous_status: self.previous_status.map(|s| s.code().to_string()),
            new_status: self.new_status.code().to_string(),
            changed_at: self.changed_at.unwrap_or_else(Utc::now),
            changed_by: self.actor,
            changed_by_role: self.actor_role,
            reason: self.reason.filter(|r| !r.trim().is_empty()),
            location: self.location,
            category: self.new_status.category(),
            impact: self.new_status.impact(),
            change_source: self.source,
        };

        info!(
            entry_id = %entry.id,
            entity_type = S::KIND,
            entity_id = %entry.entity_id,
            previous_status = ?entry.previous_status,
            new_status = %entry.new_status,
            impact = %entry.impact,
            "Status history entry created"
        );

        Ok(entry)
    }

    /// Validate the change against `registry` before building.
    ///
    /// First entries (no previous status) skip the rule check.
    pub fn build_checked(
        self,
        registry: &TransitionRegistry<S>,
        satisfied_conditions: &[&str],
    ) -> Result<StatusHistoryEntry, HistoryError> {
        if let Some(previous) = self.previous_status {
            let validation = registry.validate_transition(
                previous,
                self.new_status,
                &self.actor_role,
                self.reason.as_deref(),
                satisfied_conditions,
            );
            if !validation.is_valid {
                return Err(HistoryError::Rejected {
                    errors: validation.errors,
                });
            }
        }
        self.build()
    }
}

/// Validate a status change and produce its history entry in one step
pub fn record_transition<S: Classified>(
    registry: &TransitionRegistry<S>,
    builder: HistoryEntryBuilder<S>,
    satisfied_conditions: &[&str],
) -> Result<StatusHistoryEntry, HistoryError> {
    builder.build_checked(registry, satisfied_conditions)
}
