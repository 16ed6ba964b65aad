//! Locations of the config files merged by [`ConfigLoader`](crate::ConfigLoader).

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const USER_CONFIG_FILE: &str = "config.toml";
const PROJECT_CONFIG_FILE: &str = "bailiff.toml";
const LOCAL_CONFIG_FILE: &str = "bailiff.local.toml";

/// Where bailiff looks for config files.
///
/// The user directory comes from the platform (`~/.config/bailiff` on
/// Linux) unless overridden; project files live in the project directory.
#[derive(Debug, Clone)]
pub struct Paths {
    user_config_dir: Option<PathBuf>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            user_config_dir: ProjectDirs::from("com", "Bailiff", "bailiff")
                .map(|dirs| dirs.config_dir().to_path_buf()),
        }
    }

    /// Uses `dir` instead of the platform user config directory.
    pub fn with_user_config_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.user_config_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        self.user_config_dir
            .as_ref()
            .map(|dir| dir.join(USER_CONFIG_FILE))
            .ok_or(ConfigError::NoUserConfigDir)
    }

    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(PROJECT_CONFIG_FILE)
    }

    /// Local overrides, not meant to be checked in.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(LOCAL_CONFIG_FILE)
    }

    /// The config files that exist for `project_dir`, lowest precedence first.
    ///
    /// A missing user directory is skipped rather than reported.
    pub fn existing_files(&self, project_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let project_dir = project_dir.as_ref();

        self.user_config_file()
            .ok()
            .into_iter()
            .chain([
                Self::project_config_file(project_dir),
                Self::local_config_file(project_dir),
            ])
            .filter(|path| path.is_file())
            .collect()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
