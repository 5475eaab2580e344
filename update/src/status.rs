//! Read-only report on the success stamp

use crate::gate::StalenessGate;
use chrono::{DateTime, Duration, Utc};
use config::ResourceConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// Snapshot of the stamp as the periodic action would see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampStatus {
    pub name: String,
    pub path: PathBuf,
    pub exists: bool,
    pub modified: Option<DateTime<Utc>>,
    /// Seconds since the stamp was touched; negative if its mtime is in the future
    pub age_secs: Option<i64>,
    pub frequency: i64,
    pub up_to_date: bool,
    /// When the next periodic run will refresh again
    pub next_due: Option<DateTime<Utc>>,
}

impl StampStatus {
    pub fn inspect(config: &ResourceConfig) -> Self {
        Self::inspect_at(config, SystemTime::now())
    }

    pub fn inspect_at(config: &ResourceConfig, now: SystemTime) -> Self {
        let gate = StalenessGate::new(config.stamp_path());
        let marker = gate.marker();
        let modified = marker.modified().map(DateTime::<Utc>::from);
        let now_utc = DateTime::<Utc>::from(now);

        let age_secs = modified.map(|m| (now_utc - m).num_seconds());
        let next_due = match modified {
            Some(m) if config.frequency > 0 => Duration::try_seconds(config.frequency)
                .and_then(|f| m.checked_add_signed(f)),
            _ => None,
        };

        Self {
            name: config.name.clone(),
            path: marker.path().to_path_buf(),
            exists: marker.exists(),
            modified,
            age_secs,
            frequency: config.frequency,
            up_to_date: gate.is_up_to_date_at(config.frequency, now),
            next_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Marker;
    use tempfile::TempDir;

    #[test]
    fn test_missing_stamp() {
        let temp = TempDir::new().unwrap();
        let config = ResourceConfig::default().with_stamp_dir(temp.path());

        let status = StampStatus::inspect(&config);

        assert!(!status.exists);
        assert!(!status.up_to_date);
        assert_eq!(status.modified, None);
        assert_eq!(status.age_secs, None);
        assert_eq!(status.next_due, None);
        assert!(!config.stamp_path().exists());
    }

    #[test]
    fn test_recent_stamp() {
        let temp = TempDir::new().unwrap();
        let config = ResourceConfig::default().with_stamp_dir(temp.path());
        let now = SystemTime::now();
        Marker::new(config.stamp_path())
            .touch_at(now - std::time::Duration::from_secs(100))
            .unwrap();

        let status = StampStatus::inspect_at(&config, now);

        assert!(status.exists);
        assert!(status.up_to_date);
        let age = status.age_secs.unwrap();
        assert!((99..=101).contains(&age));
        let due = status.next_due.unwrap();
        assert!(due > DateTime::<Utc>::from(now));
    }

    #[test]
    fn test_serializes() {
        let temp = TempDir::new().unwrap();
        let config = ResourceConfig::named("nightly").with_stamp_dir(temp.path());
        let status = StampStatus::inspect(&config);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["name"], "nightly");
        assert_eq!(json["frequency"], 86_400);
        assert_eq!(json["up_to_date"], false);
    }
}
