//! `homebrew_update` resource configuration

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Seconds between periodic refreshes (one day)
pub const DEFAULT_FREQUENCY: i64 = 86_400;

/// Directory holding the update success stamp
pub const DEFAULT_STAMP_DIR: &str = "/var/lib/homebrew/periodic";

/// File name of the update success stamp
pub const DEFAULT_STAMP_FILE: &str = "update-success-stamp";

/// Actions the resource accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Refresh only when the stamp is older than `frequency`
    #[default]
    Periodic,
    /// Refresh unconditionally
    Update,
}

impl Action {
    /// All allowed actions
    pub const ALL: [Action; 2] = [Action::Periodic, Action::Update];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Periodic => "periodic",
            Action::Update => "update",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "periodic" => Ok(Action::Periodic),
            "update" => Ok(Action::Update),
            other => Err(ConfigError::UnknownAction(other.to_string())),
        }
    }
}

/// Configuration for one `homebrew_update` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Cosmetic identifier, may be empty
    pub name: String,
    /// Minimum seconds between periodic refreshes; `<= 0` means always stale
    pub frequency: i64,
    /// Action run when none is requested explicitly
    pub action: Action,
    /// Directory holding the success stamp
    pub stamp_dir: PathBuf,
    /// File name of the success stamp inside `stamp_dir`
    pub stamp_file: String,
    /// Explicit brew executable; located on `PATH` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brew_path: Option<PathBuf>,
    /// User that runs `brew update`; owner of the brew executable when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            frequency: DEFAULT_FREQUENCY,
            action: Action::default(),
            stamp_dir: PathBuf::from(DEFAULT_STAMP_DIR),
            stamp_file: DEFAULT_STAMP_FILE.to_string(),
            brew_path: None,
            owner: None,
        }
    }
}

impl ResourceConfig {
    /// Create a named resource with default settings
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded resource configuration");
        Ok(config)
    }

    /// Save configuration to a path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of the success stamp
    pub fn stamp_path(&self) -> PathBuf {
        self.stamp_dir.join(&self.stamp_file)
    }

    /// Set the refresh frequency in seconds
    pub fn with_frequency(mut self, frequency: i64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the stamp directory
    pub fn with_stamp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stamp_dir = dir.into();
        self
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.stamp_file.is_empty() {
            return Err(ConfigError::Invalid("stamp_file must not be empty".to_string()));
        }
        if self.stamp_file.contains(std::path::MAIN_SEPARATOR) || self.stamp_file.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "stamp_file must be a bare file name: {}",
                self.stamp_file
            )));
        }
        if !self.stamp_dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "stamp_dir must be absolute: {}",
                self.stamp_dir.display()
            )));
        }
        if let Some(owner) = &self.owner {
            if owner.trim().is_empty() {
                return Err(ConfigError::Invalid("owner must not be blank".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ResourceConfig::default();
        assert_eq!(config.name, "");
        assert_eq!(config.frequency, 86_400);
        assert_eq!(config.action, Action::Periodic);
        assert_eq!(
            config.stamp_path(),
            PathBuf::from("/var/lib/homebrew/periodic/update-success-stamp")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("periodic".parse::<Action>().unwrap(), Action::Periodic);
        assert_eq!(" Update ".parse::<Action>().unwrap(), Action::Update);
        assert!(matches!(
            "upgrade".parse::<Action>(),
            Err(ConfigError::UnknownAction(a)) if a == "upgrade"
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ResourceConfig = toml::from_str("frequency = 3600\naction = \"update\"").unwrap();
        assert_eq!(config.frequency, 3600);
        assert_eq!(config.action, Action::Update);
        assert_eq!(config.stamp_file, DEFAULT_STAMP_FILE);
        assert_eq!(config.owner, None);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("brewup.toml");

        let mut config = ResourceConfig::named("all platforms").with_frequency(60);
        config.owner = Some("admin".to_string());
        config.save_to(&path).unwrap();

        let loaded = ResourceConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ResourceConfig::load_from(&temp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validate_rejects_bad_paths() {
        let mut config = ResourceConfig::default();
        config.stamp_file = String::new();
        assert!(config.validate().is_err());

        let mut config = ResourceConfig::default();
        config.stamp_file = "nested/stamp".to_string();
        assert!(config.validate().is_err());

        let config = ResourceConfig::default().with_stamp_dir("relative/dir");
        assert!(config.validate().is_err());

        let mut config = ResourceConfig::default();
        config.owner = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_frequency_is_valid() {
        assert!(ResourceConfig::default().with_frequency(0).validate().is_ok());
        assert!(ResourceConfig::default().with_frequency(-5).validate().is_ok());
    }
}
