//! Configuration System
//!
//! Layered configuration for the registry and store: defaults, then the
//! global file (`~/.config/stowage/config.toml`), then a workspace file
//! (`stowage.toml`), then `STOWAGE_*` environment variables. Later sources
//! override earlier ones.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StowageConfig {
    /// Registry root directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Auto-register intermediate directory segments on add.
    #[serde(default = "default_true")]
    pub auto_register: bool,

    /// Cipher key for the record store (0 collapses to 1).
    #[serde(default = "default_key")]
    pub encryption_key: i32,

    /// Reject later encryption key changes.
    #[serde(default = "default_true")]
    pub safety: bool,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_root() -> PathBuf {
    ProjectDirs::from("", "", "stowage")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./stowage-data"))
}

fn default_true() -> bool {
    true
}

fn default_key() -> i32 {
    1
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            auto_register: default_true(),
            encryption_key: default_key(),
            safety: default_true(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Path to the global config file, when a home directory is resolvable.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "stowage").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl StowageConfig {
    /// Load configuration for a workspace, layering global file, workspace
    /// file, and environment overrides on top of the defaults.
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(global) = global_config_path() {
            if global.exists() {
                builder = builder.add_source(config::File::from(global).required(false));
            } else {
                warn!(
                    config_path = %global.display(),
                    "global configuration file not found; using defaults"
                );
            }
        }

        let workspace_file = workspace_root.join("stowage.toml");
        if workspace_file.exists() {
            builder = builder.add_source(config::File::from(workspace_file).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix("STOWAGE").separator("__"));

        let loaded = builder
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let config: StowageConfig = loaded
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a single file, ignoring the layered sources.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let loaded = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let config: StowageConfig = loaded
            .try_deserialize()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "registry root cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Write this configuration as pretty TOML, creating parent directories
    /// as needed.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
