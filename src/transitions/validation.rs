use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TransitionRegistry;
use crate::status::Lifecycle;

pub const APPROVAL_WARNING: &str = "This transition requires management approval";
pub const REASON_REQUIRED: &str = "A reason is required for this transition";

/// Outcome of checking one proposed status change.
///
/// `errors` and `warnings` are display sentences. The change is valid iff there
/// are no errors; warnings never block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitionValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TransitionValidation {
    fn from_messages(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

impl<S: Lifecycle> TransitionRegistry<S> {
    /// Check a status change against the rule table.
    ///
    /// A missing rule short-circuits with a single error. Otherwise role, reason
    /// and precondition problems are all collected; approval adds a warning.
    pub fn validate_transition(
        &self,
        from: S,
        to: S,
        role: &str,
        reason: Option<&str>,
        satisfied_conditions: &[&str],
    ) -> TransitionValidation {
        let Some(rule) = self.rule(from, to) else {
            debug!(kind = S::KIND, from = %from, to = %to, "No transition rule registered");
            return TransitionValidation::from_messages(
                vec![format!("Invalid transition from '{from}' to '{to}'")],
                Vec::new(),
            );
        };

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !rule.allows_role(role) {
            errors.push(format!("User role '{role}' cannot perform this transition"));
        }

        let has_reason = reason.is_some_and(|r| !r.trim().is_empty());
        if rule.requires_reason && !has_reason {
            errors.push(REASON_REQUIRED.to_string());
        }

        let missing: Vec<&str> = rule
            .conditions
            .iter()
            .map(String::as_str)
            .filter(|condition| !satisfied_conditions.contains(condition))
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Missing required conditions: {}", missing.join(", ")));
        }

        if rule.requires_approval {
            warnings.push(APPROVAL_WARNING.to_string());
        }

        debug!(
            kind = S::KIND,
            from = %from,
            to = %to,
            role = role,
            errors = errors.len(),
            warnings = warnings.len(),
            "Validated transition"
        );

        TransitionValidation::from_messages(errors, warnings)
    }
}
