//! Consecutive failed-unlock counter.
//!
//! When `max_failed_attempts` is set, the vault is erased after that many
//! wrong master passwords in a row.  The count survives restarts in
//! `lockout.json` next to the container; it holds no secrets.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::atomic_write;
use crate::errors::{SencryptError, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LockoutRecord {
    failed_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_failure: Option<DateTime<Utc>>,
}

/// Outcome of recording one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    /// Still below the limit. `remaining` is `None` when no limit is set.
    Counting { failed: u32, remaining: Option<u32> },
    /// The limit was reached; the caller must erase the vault.
    Exhausted,
}

/// Reads and updates the counter file.
#[derive(Debug, Clone)]
pub struct LockoutTracker {
    path: PathBuf,
    max_attempts: u32,
}

impl LockoutTracker {
    /// `max_attempts == 0` disables erasing; failures are still counted.
    pub fn new(path: &Path, max_attempts: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            max_attempts,
        }
    }

    /// True when reaching the limit erases the vault.
    pub fn is_enforcing(&self) -> bool {
        self.max_attempts > 0
    }

    /// Number of consecutive failures recorded so far.
    pub fn failed_attempts(&self) -> u32 {
        self.load().failed_attempts
    }

    /// Count one more failure and report whether the limit is reached.
    pub fn record_failure(&self) -> Result<LockoutStatus> {
        let mut record = self.load();
        record.failed_attempts = record.failed_attempts.saturating_add(1);
        record.last_failure = Some(Utc::now());

        let bytes = serde_json::to_vec(&record)
            .map_err(|e| SencryptError::SerializationError(format!("lockout: {e}")))?;
        atomic_write(&self.path, &bytes)?;

        let failed = record.failed_attempts;
        if self.max_attempts > 0 && failed >= self.max_attempts {
            return Ok(LockoutStatus::Exhausted);
        }
        Ok(LockoutStatus::Counting {
            failed,
            remaining: (self.max_attempts > 0).then(|| self.max_attempts - failed),
        })
    }

    /// Clear the counter (after a successful unlock or a wipe).
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// An unreadable counter file counts as zero failures.
    fn load(&self) -> LockoutRecord {
        let Ok(data) = fs::read(&self.path) else {
            return LockoutRecord::default();
        };
        serde_json::from_slice(&data).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable lockout file");
            LockoutRecord::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn counts_until_exhausted() {
        let dir = TempDir::new().unwrap();
        let tracker = LockoutTracker::new(&dir.path().join("lockout.json"), 3);

        assert_eq!(
            tracker.record_failure().unwrap(),
            LockoutStatus::Counting {
                failed: 1,
                remaining: Some(2)
            }
        );
        tracker.record_failure().unwrap();
        assert_eq!(tracker.record_failure().unwrap(), LockoutStatus::Exhausted);
    }

    #[test]
    fn count_survives_new_tracker() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lockout.json");
        LockoutTracker::new(&path, 0).record_failure().unwrap();
        assert_eq!(LockoutTracker::new(&path, 0).failed_attempts(), 1);
    }

    #[test]
    fn unlimited_never_exhausts() {
        let dir = TempDir::new().unwrap();
        let tracker = LockoutTracker::new(&dir.path().join("lockout.json"), 0);
        for _ in 0..10 {
            assert!(matches!(
                tracker.record_failure().unwrap(),
                LockoutStatus::Counting {
                    remaining: None,
                    ..
                }
            ));
        }
    }

    #[test]
    fn reset_clears_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let tracker = LockoutTracker::new(&dir.path().join("lockout.json"), 5);
        tracker.record_failure().unwrap();
        tracker.reset().unwrap();
        tracker.reset().unwrap();
        assert_eq!(tracker.failed_attempts(), 0);
    }

    #[test]
    fn garbage_file_counts_as_zero() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lockout.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(LockoutTracker::new(&path, 5).failed_attempts(), 0);
    }
}
