//! Brewup Homebrew Update Resource
//!
//! Keeps the local Homebrew repository metadata fresh by running
//! `brew update`, either unconditionally or at most once per interval.
//!
//! # Architecture
//!
//! - **Gate**: [`StalenessGate`] compares the success stamp's mtime with
//!   the configured frequency and wraps a refresh in stamp bookkeeping
//! - **Marker**: the stamp file itself
//! - **Runner**: [`CommandRunner`] executes `brew update` as the Homebrew owner
//! - **Resource**: [`HomebrewUpdate`] implements the `periodic` and
//!   `update` actions on top of the gate
//!
//! # Example
//!
//! ```no_run
//! use brewup_update::{HomebrewUpdate, ResourceConfig, UpdateActions};
//!
//! let config = ResourceConfig::named("all platforms");
//! let outcome = HomebrewUpdate::new().periodic(&config)?;
//! println!("{}", outcome);
//! # Ok::<(), brewup_update::Error>(())
//! ```

pub mod error;
pub mod gate;
pub mod marker;
pub mod owner;
pub mod platform;
pub mod resource;
pub mod runner;
pub mod status;

pub use config::{Action, ResourceConfig};
pub use error::{Error, Result};
pub use gate::{is_up_to_date, StalenessGate};
pub use marker::{Marker, MARKER_CONTENT};
pub use owner::{locate_brew, Owner, OwnerResolver, SystemOwnerResolver};
pub use platform::{HostPlatform, Platform, StaticPlatform};
pub use resource::{resource_id, HomebrewUpdate, Outcome, SkipReason, UpdateActions};
pub use runner::{default_env, CommandRunner, RefreshCommand, SystemRunner};
pub use status::StampStatus;
