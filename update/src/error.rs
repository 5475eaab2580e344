//! Error types for the Homebrew update resource

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for update operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the update actions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to create stamp directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create stamp file {path}: {source}")]
    MarkerCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed{}: {stderr}", exit_suffix(.status))]
    RefreshCommand {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Refresh succeeded but stamp {path} could not be touched: {source}")]
    MarkerTouch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot determine Homebrew owner: {0}")]
    OwnerResolution(String),

    #[error("Homebrew executable not found (searched: {})", .searched.join(", "))]
    BrewNotFound { searched: Vec<String> },
}

impl Error {
    /// Errors raised after the refresh itself succeeded.
    ///
    /// The repository metadata is fresh; only the bookkeeping is behind, so
    /// the next periodic run refreshes again.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::MarkerTouch { .. })
    }

    /// Whether the stamp was left untouched because brew itself failed
    pub fn is_command_failure(&self) -> bool {
        matches!(self, Error::RefreshCommand { .. } | Error::CommandSpawn { .. })
    }
}

fn exit_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}
