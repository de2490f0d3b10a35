// Batch checks: every entity is validated on its own, with no all-or-nothing semantics

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TransitionRegistry, TransitionValidation};
use crate::status::Lifecycle;

/// Anything with an id and a current status in status space `S`
pub trait Tracked<S> {
    fn entity_id(&self) -> &str;
    fn current_status(&self) -> S;
}

/// Minimal owned entity, e.g. a row fetched from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot<S> {
    pub id: String,
    pub status: S,
}

impl<S> EntitySnapshot<S> {
    pub fn new(id: impl Into<String>, status: S) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

impl<S: Copy> Tracked<S> for EntitySnapshot<S> {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn current_status(&self) -> S {
        self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchValidationResult<S> {
    pub entity_id: String,
    pub current_status: S,
    pub validation: TransitionValidation,
}

/// Ids split by whether their batch validation passed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPartition {
    pub ready: Vec<String>,
    pub blocked: Vec<String>,
}

impl<S: Lifecycle> TransitionRegistry<S> {
    /// One result per entity, in input order
    pub fn validate_batch_transition<E: Tracked<S>>(
        &self,
        entities: &[E],
        target: S,
        role: &str,
    ) -> Vec<BatchValidationResult<S>> {
        let results: Vec<_> = entities
            .iter()
            .map(|entity| BatchValidationResult {
                entity_id: entity.entity_id().to_string(),
                current_status: entity.current_status(),
                validation: self.validate_transition(
                    entity.current_status(),
                    target,
                    role,
                    None,
                    &[],
                ),
            })
            .collect();

        debug!(
            kind = S::KIND,
            target = %target,
            total = results.len(),
            valid = results.iter().filter(|r| r.validation.is_valid).count(),
            "Validated batch transition"
        );
        results
    }

    /// Entities with a registered edge to `target`, ignoring role, reason and conditions
    pub fn transitionable<'a, E: Tracked<S>>(&self, entities: &'a [E], target: S) -> Vec<&'a E> {
        entities
            .iter()
            .filter(|entity| self.is_valid_transition(entity.current_status(), target))
            .collect()
    }

    pub fn partition_batch<E: Tracked<S>>(
        &self,
        entities: &[E],
        target: S,
        role: &str,
    ) -> BatchPartition {
        let mut partition = BatchPartition::default();
        for result in self.validate_batch_transition(entities, target, role) {
            if result.validation.is_valid {
                partition.ready.push(result.entity_id);
            } else {
                partition.blocked.push(result.entity_id);
            }
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PackageStatus;
    use crate::transitions::package_registry;

    fn packages() -> Vec<EntitySnapshot<PackageStatus>> {
        vec![
            EntitySnapshot::new("PKG-1", PackageStatus::ReadyForGrouping),
            EntitySnapshot::new("PKG-2", PackageStatus::Pending),
            EntitySnapshot::new("PKG-3", PackageStatus::ReadyForGrouping),
            EntitySnapshot::new("PKG-4", PackageStatus::Delivered),
        ]
    }

    #[test]
    fn test_batch_produces_one_result_per_entity_in_order() {
        let results = package_registry().validate_batch_transition(
            &packages(),
            PackageStatus::Grouped,
            "warehouse_staff",
        );
        let ids: Vec<_> = results.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["PKG-1", "PKG-2", "PKG-3", "PKG-4"]);

        let valid: Vec<_> = results.iter().map(|r| r.validation.is_valid).collect();
        assert_eq!(valid, vec![true, false, true, false]);
    }

    #[test]
    fn test_batch_failures_do_not_leak_between_entities() {
        let single = package_registry().validate_transition(
            PackageStatus::ReadyForGrouping,
            PackageStatus::Grouped,
            "warehouse_staff",
            None,
            &[],
        );
        let results = package_registry().validate_batch_transition(
            &packages(),
            PackageStatus::Grouped,
            "warehouse_staff",
        );
        assert_eq!(results[0].validation, single);
        assert_eq!(results[2].validation, single);
    }

    #[test]
    fn test_transitionable_ignores_role() {
        let entities = packages();
        let found = package_registry().transitionable(&entities, PackageStatus::Grouped);
        let ids: Vec<_> = found.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["PKG-1", "PKG-3"]);

        // driver is not allowed to group, but the pre-filter does not care
        let results = package_registry().validate_batch_transition(
            &entities,
            PackageStatus::Grouped,
            "driver",
        );
        assert!(results.iter().all(|r| !r.validation.is_valid));
    }

    #[test]
    fn test_partition_batch() {
        let partition = package_registry().partition_batch(
            &packages(),
            PackageStatus::Grouped,
            "system",
        );
        assert_eq!(partition.ready, vec!["PKG-1", "PKG-3"]);
        assert_eq!(partition.blocked, vec!["PKG-2", "PKG-4"]);
    }

    #[test]
    fn test_empty_batch() {
        let entities: Vec<EntitySnapshot<PackageStatus>> = Vec::new();
        assert!(package_registry()
            .validate_batch_transition(&entities, PackageStatus::Grouped, "admin")
            .is_empty());
    }
}
