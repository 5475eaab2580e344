//! Brewup Resource Configuration
//!
//! Configuration for the `homebrew_update` resource: how often the
//! Homebrew repository metadata may be refreshed, where the success stamp
//! lives, and which executable and user perform the refresh.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use brewup_config::ConfigLoader;
//!
//! let config = ConfigLoader::system().load().unwrap();
//! println!("stamp: {}", config.stamp_path().display());
//! println!("frequency: {}s", config.frequency);
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! name = "all platforms"
//! frequency = 86400
//! action = "periodic"
//! stamp_dir = "/var/lib/homebrew/periodic"
//! stamp_file = "update-success-stamp"
//! # brew_path = "/opt/homebrew/bin/brew"
//! # owner = "admin"
//! ```

pub mod error;
pub mod loader;
pub mod resource;

pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use resource::{
    Action, ResourceConfig, DEFAULT_FREQUENCY, DEFAULT_STAMP_DIR, DEFAULT_STAMP_FILE,
};
