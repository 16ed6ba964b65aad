//! Configuration loader with multi-source merging

use crate::{BailiffConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    paths: Paths,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader rooted at the current directory
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            paths: Paths::new(),
            env_prefix: "BAILIFF".to_string(),
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Reads `config.toml` from `dir` instead of the platform user directory.
    pub fn with_user_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.paths = self.paths.with_user_config_dir(dir);
        self
    }

    /// Set the environment variable prefix (default: "BAILIFF")
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// Built-in defaults, then the user, project and local files, then
    /// environment variables. The merged result is validated.
    pub fn load(self) -> Result<BailiffConfig> {
        let defaults = BailiffConfig::default();
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&defaults)?);

        for file in self.paths.existing_files(&self.project_dir) {
            builder = builder.add_source(toml_file(file));
        }

        // BAILIFF_NAMING__POLICY_SUFFIX -> naming.policy_suffix
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let bailiff_config: BailiffConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        bailiff_config.validate()?;

        Ok(bailiff_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> BailiffConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn toml_file(path: PathBuf) -> config::File<config::FileSourceFile, config::FileFormat> {
    config::File::from(path)
        .required(false)
        .format(config::FileFormat::Toml)
}
