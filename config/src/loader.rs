//! Configuration loading utilities
//!
//! Locates the resource configuration file and applies defaults and
//! validation.

use crate::{ConfigError, ResourceConfig, Result};
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the configuration root
pub const CONFIG_FILE: &str = "brewup.toml";

/// Configuration loader for the resource configuration
pub struct ConfigLoader {
    /// Root path for configuration
    root: PathBuf,
    /// Whether to use default values when the file is missing
    use_defaults: bool,
    /// Whether to validate configuration after loading
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            use_defaults: true,
            validate: true,
        }
    }

    /// Create a loader for the default system configuration
    pub fn system() -> Self {
        Self::new("/etc/brewup")
    }

    /// Set whether to use defaults for a missing config file
    pub fn use_defaults(mut self, use_defaults: bool) -> Self {
        self.use_defaults = use_defaults;
        self
    }

    /// Set whether to validate configuration
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Load the configuration
    pub fn load(&self) -> Result<ResourceConfig> {
        let path = self.config_path();
        let config = if path.exists() {
            ResourceConfig::load_from(&path)?
        } else if self.use_defaults {
            ResourceConfig::default()
        } else {
            return Err(ConfigError::NotFound(path));
        };

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Get the configuration root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}
