//! The `homebrew_update` resource
//!
//! Exposes the two actions a host framework dispatches to:
//!
//! - **periodic**: refresh only when the success stamp is stale
//! - **update**: refresh unconditionally
//!
//! Both are silent no-ops on platforms other than macOS.

use crate::gate::StalenessGate;
use crate::owner::{locate_brew, OwnerResolver, SystemOwnerResolver};
use crate::platform::{HostPlatform, Platform};
use crate::runner::{CommandRunner, RefreshCommand, SystemRunner};
use crate::Result;
use config::{Action, ResourceConfig};
use std::fmt;
use tracing::{debug, info};

const PERIODIC_DESCRIPTION: &str = "update new lists of packages";
const FORCED_DESCRIPTION: &str = "force update new lists of packages";

/// Why an action made no changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a platform Homebrew updates are managed on
    UnsupportedPlatform,
    /// The stamp is younger than the configured frequency
    UpToDate,
    /// Why-run mode: the action would have converged
    WhyRun { description: String },
}

/// Result of running one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The repository was refreshed
    Updated { description: String },
    /// Nothing was changed
    Skipped(SkipReason),
}

impl Outcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, Outcome::Updated { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated { description } => write!(f, "updated: {}", description),
            Outcome::Skipped(SkipReason::UnsupportedPlatform) => {
                f.write_str("skipped: unsupported platform")
            }
            Outcome::Skipped(SkipReason::UpToDate) => f.write_str("up to date"),
            Outcome::Skipped(SkipReason::WhyRun { description }) => {
                write!(f, "would {}", description)
            }
        }
    }
}

/// The actions a host framework can dispatch to
pub trait UpdateActions {
    /// Refresh when the stamp is older than `config.frequency`
    fn periodic(&self, config: &ResourceConfig) -> Result<Outcome>;

    /// Refresh unconditionally
    fn update(&self, config: &ResourceConfig) -> Result<Outcome>;

    /// Dispatch `action`
    fn run_action(&self, action: Action, config: &ResourceConfig) -> Result<Outcome> {
        match action {
            Action::Periodic => self.periodic(config),
            Action::Update => self.update(config),
        }
    }

    /// Dispatch the configured default action
    fn run(&self, config: &ResourceConfig) -> Result<Outcome> {
        self.run_action(config.action, config)
    }
}

/// Display name in the `homebrew_update[name]` form
pub fn resource_id(config: &ResourceConfig) -> String {
    format!("homebrew_update[{}]", config.name)
}

/// Staleness-gated Homebrew refresh
pub struct HomebrewUpdate<R = SystemRunner, P = HostPlatform> {
    runner: R,
    platform: P,
    owners: Option<Box<dyn OwnerResolver>>,
    why_run: bool,
}

impl HomebrewUpdate {
    /// Handler that spawns real processes on the real host
    pub fn new() -> Self {
        Self::with_parts(SystemRunner, HostPlatform)
    }
}

impl Default for HomebrewUpdate {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, P: Platform> HomebrewUpdate<R, P> {
    pub fn with_parts(runner: R, platform: P) -> Self {
        Self {
            runner,
            platform,
            owners: None,
            why_run: false,
        }
    }

    /// Override how the brew owner is resolved.
    ///
    /// Without one, the configured `owner` or the brew executable's owner
    /// is used.
    pub fn with_owner_resolver(mut self, resolver: impl OwnerResolver + 'static) -> Self {
        self.owners = Some(Box::new(resolver));
        self
    }

    /// Report what would converge without touching anything
    pub fn why_run(mut self, why_run: bool) -> Self {
        self.why_run = why_run;
        self
    }

    fn converge_by(&self, config: &ResourceConfig, description: &str) -> Result<Outcome> {
        if self.why_run {
            info!(resource = %resource_id(config), "Would {}", description);
            return Ok(Outcome::Skipped(SkipReason::WhyRun {
                description: description.to_string(),
            }));
        }

        info!(resource = %resource_id(config), "{}", description);
        self.do_update(config)?;
        Ok(Outcome::Updated {
            description: description.to_string(),
        })
    }

    fn do_update(&self, config: &ResourceConfig) -> Result<()> {
        let brew = locate_brew(config.brew_path.as_deref())?;
        let owner = match &self.owners {
            Some(resolver) => resolver.resolve(&brew)?,
            None => SystemOwnerResolver::new(config.owner.clone()).resolve(&brew)?,
        };
        debug!(brew = %brew.display(), owner = %owner.name, "Prepared refresh");

        let command = RefreshCommand::brew_update(brew, owner);
        StalenessGate::new(config.stamp_path()).perform_refresh(&self.runner, &command)
    }

    fn platform_supported(&self, config: &ResourceConfig) -> bool {
        let supported = self.platform.is_supported();
        if !supported {
            debug!(
                resource = %resource_id(config),
                platform = self.platform.name(),
                "Skipping on unsupported platform"
            );
        }
        supported
    }
}

impl<R: CommandRunner, P: Platform> UpdateActions for HomebrewUpdate<R, P> {
    fn periodic(&self, config: &ResourceConfig) -> Result<Outcome> {
        if !self.platform_supported(config) {
            return Ok(Outcome::Skipped(SkipReason::UnsupportedPlatform));
        }

        if StalenessGate::new(config.stamp_path()).is_up_to_date(config.frequency) {
            debug!(resource = %resource_id(config), "Repository metadata is fresh");
            return Ok(Outcome::Skipped(SkipReason::UpToDate));
        }

        self.converge_by(config, PERIODIC_DESCRIPTION)
    }

    fn update(&self, config: &ResourceConfig) -> Result<Outcome> {
        if !self.platform_supported(config) {
            return Ok(Outcome::Skipped(SkipReason::UnsupportedPlatform));
        }

        self.converge_by(config, FORCED_DESCRIPTION)
    }
}
