//! Governance configuration module
//!
//! Configuration is layered with the `config` and `dotenvy` crates: an
//! optional YAML policy file first, then environment variables with the
//! `TOROIDAL` prefix, nested values separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use toroidal_governance::config::GovernanceConfig;
//!
//! let config = GovernanceConfig::load_from(Some("governance/policies/default.yaml".as_ref()))
//!     .expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Exploring {}", config.lightface.topic);
//! ```

mod error;
mod logging;
mod policy;
mod storage;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use policy::{CyclePolicy, DarkfacePolicy, LightfacePolicy};
pub use storage::{StorageBackend, StorageConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TOROIDAL";

/// Root governance configuration
///
/// Mirrors the policy file layout, with storage and logging sections added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Name given to cycles started without one
    #[serde(default = "default_cycle_name")]
    pub default_cycle_name: String,

    #[serde(default)]
    pub lightface: LightfacePolicy,

    #[serde(default)]
    pub darkface: DarkfacePolicy,

    #[serde(default)]
    pub cycle: CyclePolicy,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_name() -> String {
    "Default Toroidal Grammar Policy".to_string()
}

fn default_description() -> String {
    "Default policy for balancing exploration and synthesis".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_cycle_name() -> String {
    "Toroidal Cycle".to_string()
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            version: default_version(),
            default_cycle_name: default_cycle_name(),
            lightface: LightfacePolicy::default(),
            darkface: DarkfacePolicy::default(),
            cycle: CyclePolicy::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GovernanceConfig {
    /// Load configuration from environment variables only
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an optional policy file plus the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the YAML policy at `path`, if given and present
    /// 3. Applies environment variables with `TOROIDAL` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TOROIDAL__LIGHTFACE__TOPIC=memory` -> `lightface.topic = memory`
    /// - `TOROIDAL__STORAGE__BACKEND=memory` -> `storage.backend = memory`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is malformed or a value cannot be
    /// parsed into its expected type
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty topic, a duration outside
    /// 1..=365 days, a phase order not starting with lightface, or an empty
    /// storage directory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_cycle_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("default_cycle_name"));
        }
        self.lightface.validate()?;
        self.cycle.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Render this configuration as a YAML policy document
    pub fn to_policy_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write a policy file with default values, creating parent directories.
    ///
    /// Returns false without touching anything when `path` already exists.
    pub fn write_default_policy(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_policy_yaml()?)?;
        Ok(true)
    }
}

/// The default configuration rendered as YAML
pub fn default_policy_yaml() -> Result<String, ConfigError> {
    GovernanceConfig::default().to_policy_yaml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("TOROIDAL__LIGHTFACE__TOPIC");
        env::remove_var("TOROIDAL__LIGHTFACE__NODE_COUNT");
        env::remove_var("TOROIDAL__STORAGE__BACKEND");
    }

    #[test]
    fn test_defaults_without_sources() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = GovernanceConfig::load().unwrap();

        assert_eq!(config.default_cycle_name, "Toroidal Cycle");
        assert_eq!(config.lightface.topic, "cognitive architecture");
        assert_eq!(config.lightface.duration, 2);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TOROIDAL__LIGHTFACE__TOPIC", "memory systems");
        env::set_var("TOROIDAL__LIGHTFACE__NODE_COUNT", "4");
        env::set_var("TOROIDAL__STORAGE__BACKEND", "memory");
        let result = GovernanceConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.lightface.topic, "memory systems");
        assert_eq!(config.lightface.node_count, 4);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_policy_file_is_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policy.yaml");
        std::fs::write(
            &path,
            "default_cycle_name: Spring\nlightface:\n  topic: attention\n  duration: 5\ndarkface:\n  title: Convergence\n",
        )
        .unwrap();

        let config = GovernanceConfig::load_from(Some(&path)).unwrap();

        assert_eq!(config.default_cycle_name, "Spring");
        assert_eq!(config.lightface.topic, "attention");
        assert_eq!(config.lightface.duration, 5);
        assert_eq!(config.darkface.title.as_deref(), Some("Convergence"));
        assert_eq!(config.lightface.node_count, 10);
    }

    #[test]
    fn test_missing_policy_file_falls_back_to_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let config =
            GovernanceConfig::load_from(Some(&temp_dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    fn test_write_default_policy_round_trips() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policies").join("default.yaml");

        assert!(GovernanceConfig::write_default_policy(&path).unwrap());
        assert!(!GovernanceConfig::write_default_policy(&path).unwrap());

        let config = GovernanceConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_duration() {
        let mut config = GovernanceConfig::default();
        config.lightface.duration = 400;
        assert_eq!(config.validate(), Err(ValidationError::InvalidDuration(400)));
    }
}
