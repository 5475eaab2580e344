//! Success stamp persisted on the local filesystem.
//!
//! The stamp's modification time is the "last successful refresh" clock.
//! Its content is fixed and never rewritten once the file exists.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Content written when the stamp is first created
pub const MARKER_CONTENT: &str = "BREW::Update::Post-Invoke-Success\n";

/// A stamp file whose mtime records the last successful refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    path: PathBuf,
}

impl Marker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parent directory of the stamp
    pub fn dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Last modification time, `None` when the stamp is missing, unreadable
    /// or not a regular file
    pub fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path)
            .ok()
            .filter(|m| m.is_file())
            .and_then(|m| m.modified().ok())
    }

    /// Create the parent directory and any missing ancestors
    pub fn ensure_dir(&self) -> io::Result<()> {
        match self.dir() {
            Some(dir) => fs::create_dir_all(dir),
            None => Ok(()),
        }
    }

    /// Create the stamp with [`MARKER_CONTENT`] unless it already exists.
    ///
    /// Returns `true` when the file was created. An existing stamp keeps its
    /// content and timestamp.
    pub fn create_if_missing(&self) -> io::Result<bool> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                file.write_all(MARKER_CONTENT.as_bytes())?;
                file.sync_all()?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !self.path.is_dir() => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Set the stamp's modification time to now without altering content.
    ///
    /// A stamp removed since it was created is recreated first. Only
    /// ownership of the stamp is needed, not write permission.
    pub fn touch(&self) -> io::Result<()> {
        self.touch_at(SystemTime::now())
    }

    pub fn touch_at(&self, time: SystemTime) -> io::Result<()> {
        self.create_if_missing()?;
        File::open(&self.path)?.set_modified(time)
    }
}
