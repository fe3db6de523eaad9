use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{Result, TodoError, DEFAULT_STORAGE_KEY};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the storage slot files
    pub data_dir: PathBuf,

    /// Slot the list is saved under
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Config {
    /// Reads a JSON config file over the defaults; `None` gives the defaults.
    ///
    /// Fields missing from the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read config file {}: {}", path.display(), e);
            TodoError::ConfigError {
                message: format!("cannot read {}: {}", path.display(), e),
            }
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse config file {}: {}", path.display(), e);
            TodoError::ConfigError {
                message: format!("invalid config {}: {}", path.display(), e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded settings.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, storage_key: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(key) = storage_key {
            self.storage_key = key;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(TodoError::ConfigError {
                message: "storage_key must not be empty".to_string(),
            });
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(TodoError::ConfigError {
                message: "data_dir must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

// Platform data directory, or a local fallback when no home directory is known
fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "todolist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".todolist"))
}
