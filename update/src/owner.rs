//! Homebrew installation discovery
//!
//! Finds the `brew` executable and the user that owns the installation.
//! Homebrew refuses to run as root, so `brew update` is executed as that
//! owner.

use crate::{Error, Result};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::debug;
use users::os::unix::UserExt;
use users::User;

/// Standard brew locations (in search order) after `PATH`
pub const STANDARD_BREW_LOCATIONS: &[&str] = &[
    "/opt/homebrew/bin/brew",              // Apple Silicon
    "/usr/local/bin/brew",                 // Intel
    "/home/linuxbrew/.linuxbrew/bin/brew", // Linuxbrew
];

/// Locate the brew executable
///
/// Searches in order:
/// 1. The configured path (must exist)
/// 2. `brew` on `PATH`
/// 3. [`STANDARD_BREW_LOCATIONS`]
pub fn locate_brew(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::BrewNotFound {
            searched: vec![path.display().to_string()],
        });
    }

    if let Ok(path) = which::which("brew") {
        debug!(path = %path.display(), "Found brew on PATH");
        return Ok(path);
    }

    for location in STANDARD_BREW_LOCATIONS {
        let path = PathBuf::from(location);
        if path.is_file() {
            debug!(path = %path.display(), "Found brew in standard location");
            return Ok(path);
        }
    }

    let mut searched = vec!["$PATH".to_string()];
    searched.extend(STANDARD_BREW_LOCATIONS.iter().map(|s| s.to_string()));
    Err(Error::BrewNotFound { searched })
}

/// The account a refresh runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

impl Owner {
    /// Look up an account by name
    pub fn by_name(name: &str) -> Result<Self> {
        users::get_user_by_name(name)
            .map(|u| Self::from_user(&u))
            .ok_or_else(|| Error::OwnerResolution(format!("no such user: {}", name)))
    }

    /// Look up an account by uid
    pub fn by_uid(uid: u32) -> Result<Self> {
        users::get_user_by_uid(uid)
            .map(|u| Self::from_user(&u))
            .ok_or_else(|| Error::OwnerResolution(format!("no user with uid {}", uid)))
    }

    /// The account running this process
    pub fn current() -> Result<Self> {
        Self::by_uid(users::get_effective_uid())
    }

    fn from_user(user: &User) -> Self {
        Self {
            name: user.name().to_string_lossy().into_owned(),
            uid: user.uid(),
            gid: user.primary_group_id(),
            home: user.home_dir().to_path_buf(),
        }
    }
}

/// Resolves who should run `brew update`
pub trait OwnerResolver {
    fn resolve(&self, brew: &Path) -> Result<Owner>;
}

/// A fixed owner, regardless of the brew executable
impl OwnerResolver for Owner {
    fn resolve(&self, _brew: &Path) -> Result<Owner> {
        Ok(self.clone())
    }
}

/// Resolves the configured user, or else the owner of the brew executable
#[derive(Debug, Clone, Default)]
pub struct SystemOwnerResolver {
    configured: Option<String>,
}

impl SystemOwnerResolver {
    pub fn new(configured: Option<String>) -> Self {
        Self { configured }
    }
}

impl OwnerResolver for SystemOwnerResolver {
    fn resolve(&self, brew: &Path) -> Result<Owner> {
        if let Some(name) = &self.configured {
            return Owner::by_name(name);
        }

        // brew is usually a symlink into the Homebrew prefix; the prefix owner counts
        let metadata = std::fs::metadata(brew).map_err(|e| {
            Error::OwnerResolution(format!("cannot stat {}: {}", brew.display(), e))
        })?;
        let owner = Owner::by_uid(metadata.uid())?;
        debug!(brew = %brew.display(), owner = %owner.name, "Resolved Homebrew owner");
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_locate_configured_brew() {
        let temp = TempDir::new().unwrap();
        let brew = temp.path().join("brew");
        std::fs::write(&brew, "#!/bin/sh\n").unwrap();

        assert_eq!(locate_brew(Some(&brew)).unwrap(), brew);
    }

    #[test]
    fn test_locate_missing_configured_brew() {
        let result = locate_brew(Some(Path::new("/nonexistent/bin/brew")));
        assert_matches!(result, Err(Error::BrewNotFound { searched }) if searched.len() == 1);
    }

    #[test]
    fn test_owner_of_file_is_current_user() {
        let temp = TempDir::new().unwrap();
        let brew = temp.path().join("brew");
        std::fs::write(&brew, "").unwrap();

        let owner = SystemOwnerResolver::default().resolve(&brew).unwrap();
        assert_eq!(owner.uid, users::get_effective_uid());
    }

    #[test]
    fn test_configured_owner_wins() {
        let current = Owner::current().unwrap();
        let resolver = SystemOwnerResolver::new(Some(current.name.clone()));

        let owner = resolver.resolve(Path::new("/nonexistent/brew")).unwrap();
        assert_eq!(owner, current);
    }

    #[test]
    fn test_unknown_owner() {
        let resolver = SystemOwnerResolver::new(Some("no-such-brewup-user".to_string()));
        assert_matches!(
            resolver.resolve(Path::new("/nonexistent/brew")),
            Err(Error::OwnerResolution(_))
        );
    }

    #[test]
    fn test_missing_brew_cannot_be_stat() {
        let result = SystemOwnerResolver::default().resolve(Path::new("/nonexistent/brew"));
        assert_matches!(result, Err(Error::OwnerResolution(_)));
    }
}
