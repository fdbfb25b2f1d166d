/*
 *  recovery.rs
 *
 *  sleepcounter - how many sleeps until the big day?
 *
 *  Durable single-slot countdown state, so a restart resumes the count
 *  instead of re-homing the stage every boot.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::calendar::Event;

/// Bump when the on-disk layout changes; older files are treated as absent.
const RECORD_VERSION: u32 = 1;

/// Demo-only default: /var/tmp is world-writable. Deployments with more than
/// one user should point `recovery_file` somewhere private.
pub const DEFAULT_RECOVERY_FILE: &str = "/var/tmp/sleepcounter.json";

#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The full countdown length to an event, as last observed. `total` is in
/// the owning widget's unit (seconds or sleeps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownRecord {
    pub total: i64,
    pub event: Event,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    version: u32,
    #[serde(flatten)]
    record: CountdownRecord,
}

/// Single-slot persistence. One record, overwritten whole.
pub trait RecoveryStore: Send {
    /// Durably replace the stored record.
    fn record(&mut self, record: &CountdownRecord) -> Result<(), RecoveryError>;

    /// The stored record, or `None` on first run. Unreadable or unparsable
    /// state also reads as `None`: the widget re-seeds and overwrites it on
    /// the next countdown reset, which beats refusing to start.
    fn recover(&self) -> Option<CountdownRecord>;
}

/// JSON file backing. Writes go to a sibling temp file first and are moved
/// into place, so a crash mid-write never leaves a half-written record.
pub struct FileRecovery {
    path: PathBuf,
}

impl FileRecovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("recovery file at {}", path.display());
        Self { path }
    }

    fn read(path: &Path) -> Result<StoredRecord, RecoveryError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl RecoveryStore for FileRecovery {
    fn record(&mut self, record: &CountdownRecord) -> Result<(), RecoveryError> {
        info!(
            "recording countdown of {} to {} in {}",
            record.total,
            record.event.name,
            self.path.display()
        );
        let stored = StoredRecord {
            version: RECORD_VERSION,
            record: record.clone(),
        };
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_vec(&stored)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn recover(&self) -> Option<CountdownRecord> {
        match Self::read(&self.path) {
            Ok(stored) if stored.version == RECORD_VERSION => {
                info!(
                    "recovered countdown of {} to {}",
                    stored.record.total, stored.record.event.name
                );
                Some(stored.record)
            }
            Ok(stored) => {
                warn!(
                    "recovery file {} has version {}, expected {}; ignoring",
                    self.path.display(),
                    stored.version,
                    RECORD_VERSION
                );
                None
            }
            Err(RecoveryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("no recovery data found");
                None
            }
            Err(e) => {
                warn!(
                    "recovery file {} unreadable ({e}); starting fresh",
                    self.path.display()
                );
                None
            }
        }
    }
}

/// Volatile backing. The slot is shared between clones so a test can hand
/// one handle to a widget, "restart", and hand a clone to its successor.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct MemoryRecovery {
    slot: Arc<Mutex<Option<CountdownRecord>>>,
}

#[allow(dead_code)]
impl MemoryRecovery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecoveryStore for MemoryRecovery {
    fn record(&mut self, record: &CountdownRecord) -> Result<(), RecoveryError> {
        *self.slot.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    fn recover(&self) -> Option<CountdownRecord> {
        self.slot.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn xmas_record() -> CountdownRecord {
        CountdownRecord {
            total: 172_800,
            event: Event::new("Christmas", 12, 25),
        }
    }

    #[test]
    fn records_and_recovers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sleepcounter.json");
        let mut store = FileRecovery::new(&path);
        assert_eq!(store.recover(), None);
        store.record(&xmas_record()).unwrap();
        assert_eq!(store.recover(), Some(xmas_record()));
        // a second store at the same path sees the same record
        let store = FileRecovery::new(&path);
        assert_eq!(store.recover(), Some(xmas_record()));
    }

    #[test]
    fn overwrites_previous_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sleepcounter.json");
        let mut store = FileRecovery::new(&path);
        store.record(&xmas_record()).unwrap();
        let newer = CountdownRecord {
            total: 9,
            event: Event::new("New Year's Day", 1, 1),
        };
        store.record(&newer).unwrap();
        assert_eq!(store.recover(), Some(newer));
    }

    #[test]
    fn corrupt_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sleepcounter.json");
        fs::write(&path, b"not json at all").unwrap();
        let store = FileRecovery::new(&path);
        assert_eq!(store.recover(), None);
    }

    #[test]
    fn version_mismatch_reads_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sleepcounter.json");
        fs::write(
            &path,
            br#"{"version":99,"total":5,"event":{"name":"x","month":1,"day":1}}"#,
        )
        .unwrap();
        let store = FileRecovery::new(&path);
        assert_eq!(store.recover(), None);
    }

    #[test]
    fn memory_store_shares_its_slot() {
        let mut store = MemoryRecovery::new();
        let survivor = store.clone();
        store.record(&xmas_record()).unwrap();
        assert_eq!(survivor.recover(), Some(xmas_record()));
    }
}
