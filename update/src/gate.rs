//! Staleness gate
//!
//! Decides whether the Homebrew repository needs refreshing, based on the
//! success stamp's mtime, and owns the stamp bookkeeping around a refresh.
//!
//! There is no locking around the stamp. Two invocations racing on the
//! same stamp may both see it stale and both run the refresh; the refresh
//! command itself has to tolerate that.

use crate::marker::Marker;
use crate::runner::{CommandRunner, RefreshCommand};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Whether the stamp at `marker_path` is younger than `frequency` seconds
pub fn is_up_to_date(marker_path: &Path, frequency: i64) -> bool {
    StalenessGate::new(marker_path).is_up_to_date(frequency)
}

/// Gate around a single success stamp
#[derive(Debug, Clone)]
pub struct StalenessGate {
    marker: Marker,
}

impl StalenessGate {
    pub fn new(marker_path: impl Into<PathBuf>) -> Self {
        Self {
            marker: Marker::new(marker_path),
        }
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// True iff the stamp exists and its mtime is after `now - frequency`.
    ///
    /// A missing stamp is never up to date, and neither is any stamp when
    /// `frequency <= 0`.
    pub fn is_up_to_date(&self, frequency: i64) -> bool {
        self.is_up_to_date_at(frequency, SystemTime::now())
    }

    pub fn is_up_to_date_at(&self, frequency: i64, now: SystemTime) -> bool {
        if frequency <= 0 {
            debug!(frequency, "Non-positive frequency, always stale");
            return false;
        }

        let modified = match self.marker.modified() {
            Some(modified) => modified,
            None => {
                debug!(stamp = %self.marker.path().display(), "No stamp, stale");
                return false;
            }
        };

        let fresh = match now.checked_sub(Duration::from_secs(frequency as u64)) {
            Some(threshold) => modified > threshold,
            // window reaches back before the clock's origin
            None => true,
        };
        debug!(stamp = %self.marker.path().display(), frequency, fresh, "Checked stamp");
        fresh
    }

    /// Refresh through `runner`, then touch the stamp.
    ///
    /// The stamp directory and file are created first if missing. The
    /// stamp's mtime only moves after `command` succeeds; a failed command
    /// leaves it as it was so the next periodic run retries.
    pub fn perform_refresh<R>(&self, runner: &R, command: &RefreshCommand) -> Result<()>
    where
        R: CommandRunner + ?Sized,
    {
        let path = self.marker.path();

        self.marker
            .ensure_dir()
            .map_err(|source| Error::DirectoryCreate {
                path: self.marker.dir().unwrap_or(path).to_path_buf(),
                source,
            })?;

        let created = self
            .marker
            .create_if_missing()
            .map_err(|source| Error::MarkerCreate {
                path: path.to_path_buf(),
                source,
            })?;
        if created {
            debug!(stamp = %path.display(), "Created stamp");
        }

        runner.run(command)?;
        info!(command = %command, "Refresh succeeded");

        self.marker.touch().map_err(|source| {
            warn!(stamp = %path.display(), error = %source, "Failed to touch stamp");
            Error::MarkerTouch {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
