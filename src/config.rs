use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::status::{GroupStatus, PackageStatus};
use crate::transitions::{group_registry, package_registry, TransitionRegistry};

/// Main configuration structure for parcel-lifecycle
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Custom transition tables
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// TOML file replacing the built-in package table
    pub package_rules_path: Option<String>,
    /// TOML file replacing the built-in group table
    pub group_rules_path: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

/// Either a built-in table or one loaded from a custom file
pub enum RegistryHandle<S: crate::status::Lifecycle> {
    Builtin(&'static TransitionRegistry<S>),
    Custom(TransitionRegistry<S>),
}

impl<S: crate::status::Lifecycle> std::ops::Deref for RegistryHandle<S> {
    type Target = TransitionRegistry<S>;

    fn deref(&self) -> &Self::Target {
        match self {
            RegistryHandle::Builtin(registry) => *registry,
            RegistryHandle::Custom(registry) => registry,
        }
    }
}

/// PARCEL_LIFECYCLE_OBSERVABILITY__JSON_LOGS=true -> observability.json_logs
fn env_source() -> Environment {
    Environment::with_prefix("PARCEL_LIFECYCLE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl LifecycleConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (parcel-lifecycle.toml)
    /// 3. Environment variables (prefixed with PARCEL_LIFECYCLE_, `__` between sections)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("parcel-lifecycle.toml").exists() {
            builder = builder.add_source(File::with_name("parcel-lifecycle"));
        }

        builder = builder.add_source(env_source());

        let config = builder.build()?;
        let lifecycle_config: LifecycleConfig = config.try_deserialize()?;
        Ok(lifecycle_config)
    }

    /// Load configuration from an explicit file, still honouring environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(env_source())
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn package_registry(&self) -> Result<RegistryHandle<PackageStatus>> {
        match &self.rules.package_rules_path {
            Some(path) => Ok(RegistryHandle::Custom(TransitionRegistry::load_file(path)?)),
            None => Ok(RegistryHandle::Builtin(package_registry())),
        }
    }

    pub fn group_registry(&self) -> Result<RegistryHandle<GroupStatus>> {
        match &self.rules.group_rules_path {
            Some(path) => Ok(RegistryHandle::Custom(TransitionRegistry::load_file(path)?)),
            None => Ok(RegistryHandle::Builtin(group_registry())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_use_builtin_tables() {
        let config = LifecycleConfig::default();
        assert_eq!(config.observability.log_level, "warn");
        assert!(!config.observability.json_logs);

        let packages = config.package_registry().unwrap();
        assert!(matches!(packages, RegistryHandle::Builtin(_)));
        assert_eq!(packages.len(), package_registry().len());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("parcel-lifecycle.toml");
        let mut config = LifecycleConfig::default();
        config.observability.json_logs = true;
        config.observability.log_level = "debug".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = LifecycleConfig::load_from(&path).unwrap();
        assert!(loaded.observability.json_logs);
        assert_eq!(loaded.observability.log_level, "debug");
        assert!(loaded.rules.package_rules_path.is_none());
    }

    #[test]
    fn test_custom_package_rules_are_loaded() {
        let temp_dir = TempDir::new().unwrap();
        let rules_path = temp_dir.path().join("rules.toml");
        std::fs::write(
            &rules_path,
            r#"
                [[rules]]
                from = "pending"
                to = "cancelled"
                allowed_roles = ["customer_service"]
                requires_reason = true
            "#,
        )
        .unwrap();

        let config = LifecycleConfig {
            rules: RulesConfig {
                package_rules_path: Some(rules_path.display().to_string()),
                group_rules_path: None,
            },
            ..Default::default()
        };

        let registry = config.package_registry().unwrap();
        assert!(matches!(registry, RegistryHandle::Custom(_)));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_valid_transition(PackageStatus::Pending, PackageStatus::Cancelled));
        assert!(!registry.is_valid_transition(PackageStatus::Pending, PackageStatus::Received));

        // the built-in table is untouched
        assert!(package_registry()
            .is_valid_transition(PackageStatus::Pending, PackageStatus::Received));
    }

    #[test]
    fn test_missing_rules_file_is_an_error() {
        let config = LifecycleConfig {
            rules: RulesConfig {
                package_rules_path: None,
                group_rules_path: Some("/nonexistent/groups.toml".to_string()),
            },
            ..Default::default()
        };
        assert!(config.group_registry().is_err());
    }
}
