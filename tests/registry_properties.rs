//! Property-based tests for the transition registries
//!
//! These tests check invariants over the whole status domain rather than
//! hand-picked examples:
//! - every registered edge is valid, reverse edges only when registered
//! - terminal statuses have no way out
//! - unregistered pairs never validate, whatever else is supplied
//! - fully satisfied transitions always validate, approval only warns
//! - role checks are exact, with no hierarchy
//! - batch validation is per-entity

use parcel_lifecycle::{
    group_registry, package_registry, EntitySnapshot, GroupStatus, Lifecycle, PackageStatus,
    TransitionRegistry, TransitionRule,
};
use proptest::prelude::*;

fn package_status_strategy() -> impl Strategy<Value = PackageStatus> {
    proptest::sample::select(PackageStatus::all().to_vec())
}

fn group_status_strategy() -> impl Strategy<Value = GroupStatus> {
    proptest::sample::select(GroupStatus::all().to_vec())
}

fn package_rule_strategy() -> impl Strategy<Value = TransitionRule<PackageStatus>> {
    proptest::sample::select(package_registry().rules().cloned().collect::<Vec<_>>())
}

fn group_rule_strategy() -> impl Strategy<Value = TransitionRule<GroupStatus>> {
    proptest::sample::select(group_registry().rules().cloned().collect::<Vec<_>>())
}

fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("admin".to_string()),
        Just("warehouse_manager".to_string()),
        Just("warehouse_staff".to_string()),
        Just("driver".to_string()),
        Just("customer_service".to_string()),
        Just("system".to_string()),
        "[a-z_]{1,16}",
    ]
}

fn check_edges_and_reverse<S: Lifecycle>(registry: &TransitionRegistry<S>) {
    for rule in registry.rules() {
        assert!(registry.is_valid_transition(rule.from, rule.to));
        assert_eq!(
            registry.is_valid_transition(rule.to, rule.from),
            registry.rules().any(|r| r.from == rule.to && r.to == rule.from),
        );
        assert!(registry.valid_next_statuses(rule.from).contains(&rule.to));
    }
}

fn check_terminal_statuses<S: Lifecycle>(registry: &TransitionRegistry<S>) {
    for status in S::all().iter().copied().filter(|s| s.is_terminal()) {
        assert!(
            registry.valid_next_statuses(status).is_empty(),
            "terminal status {status} has outbound transitions"
        );
    }
}

#[test]
fn registered_edges_are_valid_and_not_implicitly_symmetric() {
    check_edges_and_reverse(package_registry());
    check_edges_and_reverse(group_registry());
}

#[test]
fn terminal_statuses_have_no_next_statuses() {
    check_terminal_statuses(package_registry());
    check_terminal_statuses(group_registry());
}

#[test]
fn at_least_one_reverse_edge_is_absent() {
    // Pending -> Received exists, Received -> Pending does not
    let registry = package_registry();
    assert!(registry.is_valid_transition(PackageStatus::Pending, PackageStatus::Received));
    assert!(!registry.is_valid_transition(PackageStatus::Received, PackageStatus::Pending));
}

proptest! {
    #[test]
    fn unregistered_pairs_never_validate(
        from in package_status_strategy(),
        to in package_status_strategy(),
        role in role_strategy(),
        reason in proptest::option::of("[a-z ]{0,20}"),
        conditions in proptest::collection::vec("[a-z_]{1,24}", 0..4),
    ) {
        let registry = package_registry();
        prop_assume!(!registry.is_valid_transition(from, to));

        let satisfied: Vec<&str> = conditions.iter().map(String::as_str).collect();
        let result = registry.validate_transition(from, to, &role, reason.as_deref(), &satisfied);
        prop_assert!(!result.is_valid);
        prop_assert_eq!(result.errors.len(), 1);
        prop_assert!(result.warnings.is_empty());
    }

    #[test]
    fn fully_satisfied_transitions_validate(
        rule in package_rule_strategy(),
        reason in "[a-z]{1,12}( [a-z]{1,12}){0,3}",
    ) {
        let registry = package_registry();
        let satisfied: Vec<&str> = rule.conditions.iter().map(String::as_str).collect();
        for role in &rule.allowed_roles {
            let result =
                registry.validate_transition(rule.from, rule.to, role, Some(&reason), &satisfied);
            prop_assert!(
                result.is_valid,
                "{} -> {} as {}: {:?}",
                rule.from,
                rule.to,
                role,
                result.errors
            );
            prop_assert!(result.errors.is_empty());
            prop_assert_eq!(result.warnings.len(), usize::from(rule.requires_approval));
        }
    }

    #[test]
    fn group_transitions_with_everything_supplied_validate(rule in group_rule_strategy()) {
        let registry = group_registry();
        let satisfied: Vec<&str> = rule.conditions.iter().map(String::as_str).collect();
        for role in &rule.allowed_roles {
            let result =
                registry.validate_transition(rule.from, rule.to, role, Some("ok"), &satisfied);
            prop_assert!(result.is_valid, "{} -> {} as {}", rule.from, rule.to, role);
            prop_assert_eq!(result.warnings.len(), usize::from(rule.requires_approval));
        }
    }

    #[test]
    fn role_permission_is_literal_membership(
        from in package_status_strategy(),
        to in package_status_strategy(),
        role in role_strategy(),
        suffix in "[a-z_]{1,6}",
    ) {
        let registry = package_registry();
        let expected = registry
            .rule(from, to)
            .map(|rule| rule.allowed_roles.iter().any(|r| *r == role))
            .unwrap_or(false);
        prop_assert_eq!(registry.can_user_perform_transition(from, to, &role), expected);

        let related = format!("{}{}", role, suffix);
        let related_expected = registry
            .rule(from, to)
            .map(|rule| rule.allowed_roles.iter().any(|r| *r == related))
            .unwrap_or(false);
        prop_assert_eq!(registry.can_user_perform_transition(from, to, &related), related_expected);
    }

    #[test]
    fn batch_results_match_individual_validation(
        statuses in proptest::collection::vec(package_status_strategy(), 0..20),
        target in package_status_strategy(),
        role in role_strategy(),
    ) {
        let registry = package_registry();
        let entities: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| EntitySnapshot::new(format!("PKG-{i}"), *status))
            .collect();

        let results = registry.validate_batch_transition(&entities, target, &role);
        prop_assert_eq!(results.len(), entities.len());
        for (entity, result) in entities.iter().zip(&results) {
            prop_assert_eq!(&result.entity_id, &entity.id);
            let single = registry.validate_transition(entity.status, target, &role, None, &[]);
            prop_assert_eq!(&result.validation, &single);
        }

        let transitionable = registry.transitionable(&entities, target);
        prop_assert!(transitionable.iter().all(|e| registry.is_valid_transition(e.status, target)));
        prop_assert_eq!(
            transitionable.len(),
            entities.iter().filter(|e| registry.is_valid_transition(e.status, target)).count()
        );
    }
}
