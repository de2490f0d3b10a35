// Transition registry: which status changes are legal, for whom, and under what conditions

pub mod batch;
pub mod table;
pub mod validation;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::status::{GroupStatus, Lifecycle, PackageStatus, StatusMetadata};

pub use batch::{BatchPartition, BatchValidationResult, EntitySnapshot, Tracked};
pub use validation::TransitionValidation;

/// One legal edge in a status graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule<S> {
    pub from: S,
    pub to: S,
    /// Can happen without a person initiating it (scanner events, schedulers)
    #[serde(default)]
    pub automatic: bool,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub requires_reason: bool,
    pub allowed_roles: Vec<String>,
    /// Named preconditions the caller must report as satisfied
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl<S> TransitionRule<S> {
    pub fn new(from: S, to: S, roles: &[&str], description: &str) -> Self {
        Self {
            from,
            to,
            automatic: false,
            requires_approval: false,
            requires_reason: false,
            allowed_roles: roles.iter().map(|r| r.to_string()).collect(),
            conditions: Vec::new(),
            description: description.to_string(),
        }
    }

    pub fn automatic(mut self) -> Self {
        self.automatic = true;
        self
    }

    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    pub fn with_reason(mut self) -> Self {
        self.requires_reason = true;
        self
    }

    pub fn with_conditions(mut self, conditions: &[&str]) -> Self {
        self.conditions = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Exact-match role check; role names carry no hierarchy
    pub fn allows_role(&self, role: &str) -> bool {
        self.allowed_roles.iter().any(|allowed| allowed == role)
    }
}

/// On-disk shape of a custom rule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable<S> {
    pub rules: Vec<TransitionRule<S>>,
}

/// Immutable lookup table of transition rules for one status space.
///
/// Every legal edge is an explicit entry; there are no wildcard sources.
/// Lookups never fail: absent rules read as `false`, `None` or an empty set.
#[derive(Debug, Clone)]
pub struct TransitionRegistry<S: Lifecycle> {
    rules: BTreeMap<(S, S), TransitionRule<S>>,
}

static PACKAGE_REGISTRY: Lazy<TransitionRegistry<PackageStatus>> =
    Lazy::new(|| TransitionRegistry::from_rules_unchecked(table::package_rules()));

static GROUP_REGISTRY: Lazy<TransitionRegistry<GroupStatus>> =
    Lazy::new(|| TransitionRegistry::from_rules_unchecked(table::group_rules()));

/// Built-in package transition table
pub fn package_registry() -> &'static TransitionRegistry<PackageStatus> {
    &PACKAGE_REGISTRY
}

/// Built-in group transition table
pub fn group_registry() -> &'static TransitionRegistry<GroupStatus> {
    &GROUP_REGISTRY
}

impl<S: Lifecycle> TransitionRegistry<S> {
    /// Build a registry, rejecting rule sets that break the graph invariants
    pub fn new(rules: Vec<TransitionRule<S>>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();

        for rule in rules {
            if rule.from == rule.to {
                return Err(RegistryError::SelfLoop {
                    status: rule.from.to_string(),
                });
            }
            if rule.from.is_terminal() {
                return Err(RegistryError::TerminalSource {
                    from: rule.from.to_string(),
                    to: rule.to.to_string(),
                });
            }
            if rule.allowed_roles.is_empty() {
                return Err(RegistryError::NoAllowedRoles {
                    from: rule.from.to_string(),
                    to: rule.to.to_string(),
                });
            }
            let key = (rule.from, rule.to);
            if map.contains_key(&key) {
                return Err(RegistryError::DuplicateRule {
                    from: rule.from.to_string(),
                    to: rule.to.to_string(),
                });
            }
            map.insert(key, rule);
        }

        info!(kind = S::KIND, rules = map.len(), "Transition registry built");
        Ok(Self { rules: map })
    }

    /// Built-in tables are checked by tests instead of at startup
    pub(crate) fn from_rules_unchecked(rules: Vec<TransitionRule<S>>) -> Self {
        let rules: BTreeMap<_, _> = rules
            .into_iter()
            .map(|rule| ((rule.from, rule.to), rule))
            .collect();
        info!(kind = S::KIND, rules = rules.len(), "Built-in transition registry built");
        Self { rules }
    }

    /// Parse and validate a TOML rule table (`[[rules]]` entries)
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, RegistryError> {
        let table: RuleTable<S> = toml::from_str(content).map_err(|source| RegistryError::Parse {
            path: origin.to_string(),
            source,
        })?;
        Self::new(table.rules)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    pub fn rules(&self) -> impl Iterator<Item = &TransitionRule<S>> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_valid_transition(&self, from: S, to: S) -> bool {
        self.rules.contains_key(&(from, to))
    }

    pub fn rule(&self, from: S, to: S) -> Option<&TransitionRule<S>> {
        self.rules.get(&(from, to))
    }

    /// Destinations reachable from `from` in exactly one registered step
    pub fn valid_next_statuses(&self, from: S) -> BTreeSet<S> {
        let next: BTreeSet<S> = self
            .rules
            .keys()
            .filter(|(source, _)| *source == from)
            .map(|(_, to)| *to)
            .collect();
        debug!(kind = S::KIND, from = %from, count = next.len(), "Resolved next statuses");
        next
    }

    pub fn can_user_perform_transition(&self, from: S, to: S, role: &str) -> bool {
        self.rule(from, to).is_some_and(|rule| rule.allows_role(role))
    }

    pub fn requires_approval(&self, from: S, to: S) -> bool {
        self.rule(from, to).is_some_and(|rule| rule.requires_approval)
    }

    pub fn requires_reason(&self, from: S, to: S) -> bool {
        self.rule(from, to).is_some_and(|rule| rule.requires_reason)
    }

    pub fn metadata(&self, status: S) -> StatusMetadata {
        status.metadata()
    }

    pub fn is_terminal(&self, status: S) -> bool {
        status.is_terminal()
    }

    /// Label for a raw status code, humanized when the code is unknown
    pub fn format_status(&self, raw: &str) -> String {
        crate::status::format_status::<S>(raw)
    }

    /// Distinct role names used anywhere in the table
    pub fn roles(&self) -> BTreeSet<&str> {
        self.rules
            .values()
            .flat_map(|rule| rule.allowed_roles.iter().map(String::as_str))
            .collect()
    }
}
