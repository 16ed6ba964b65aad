//! Configuration management for bailiff
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`BAILIFF_*` prefix, highest precedence)
//! 2. bailiff.local.toml (local overrides)
//! 3. bailiff.toml (project config)
//! 4. ~/.config/bailiff/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Separator between namespace segments of a class name.
const NAMESPACE_SEPARATOR: &str = "::";

/// Main bailiff configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BailiffConfig {
    pub naming: NamingConfig,
    pub audit: AuditConfig,
}

/// Suffixes appended to a target's class name to find its policy and scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub policy_suffix: String,
    pub scope_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            policy_suffix: "Policy".to_string(),
            scope_suffix: "Scope".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Log each resolution at debug level, and failures at warn level.
    pub enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl BailiffConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without merging other sources.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_suffix("naming.policy_suffix", &self.naming.policy_suffix)?;
        validate_suffix("naming.scope_suffix", &self.naming.scope_suffix)
    }
}

fn validate_suffix(key: &str, suffix: &str) -> Result<(), ConfigError> {
    if suffix.is_empty() {
        return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
    }
    if suffix.contains(NAMESPACE_SEPARATOR) {
        return Err(ConfigError::ValidationError(format!(
            "{key} must not contain '{NAMESPACE_SEPARATOR}', got '{suffix}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = BailiffConfig::default();
        assert_eq!(config.naming.policy_suffix, "Policy");
        assert_eq!(config.naming.scope_suffix, "Scope");
        assert!(config.audit.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let mut config = BailiffConfig::default();
        config.naming.scope_suffix = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("naming.scope_suffix"));
    }

    #[test]
    fn test_validate_rejects_namespaced_suffix() {
        let mut config = BailiffConfig::default();
        config.naming.policy_suffix = "policies::Policy".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_file_partial() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("bailiff.toml");
        std::fs::write(&path, "[audit]\nenabled = false\n").unwrap();

        let config = BailiffConfig::from_file(&path).unwrap();
        assert!(!config.audit.enabled);
        assert_eq!(config.naming, NamingConfig::default());
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempdir().expect("Failed to create temp dir");

        let missing = BailiffConfig::from_file(temp_dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));

        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[naming\n").unwrap();
        let broken = BailiffConfig::from_file(&path);
        assert!(matches!(broken, Err(ConfigError::ParseError { .. })));
    }
}
