use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::metrics;
use crate::models::progress::{DrillSubmission, ProgressRecord};
use crate::services::events::{CoreEvent, EventReporter};
use crate::services::streak::compute_streak;

/// A single named slot holding one serialized progress record.
pub trait ProgressSlot: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, raw: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed slot used in production. One device, one file.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProgressSlot for FileSlot {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    fn store(&self, raw: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", self.path.display())),
        }
    }
}

/// In-memory slot for tests.
#[derive(Default)]
pub struct MemorySlot {
    cell: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        Self {
            cell: Mutex::new(Some(raw.to_string())),
        }
    }
}

impl ProgressSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.cell.lock().expect("memory slot mutex poisoned").clone())
    }

    fn store(&self, raw: &str) -> Result<()> {
        *self.cell.lock().expect("memory slot mutex poisoned") = Some(raw.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.cell.lock().expect("memory slot mutex poisoned") = None;
        Ok(())
    }
}

/// Durable local record of drill submissions and streak counters for a
/// single user on one device.
///
/// Reads never fail: a missing or corrupt slot yields the default empty
/// record. Writes are best-effort: persistence failures are reported and
/// swallowed so the session keeps working on the in-memory state.
pub struct ProgressStore {
    slot: Box<dyn ProgressSlot>,
    reporter: Arc<dyn EventReporter>,
    // Serializes read-modify-write cycles. The deployment is single-writer
    // by design; this keeps concurrent axum workers from interleaving.
    write_guard: Mutex<()>,
}

impl ProgressStore {
    pub fn new(slot: Box<dyn ProgressSlot>, reporter: Arc<dyn EventReporter>) -> Self {
        Self {
            slot,
            reporter,
            write_guard: Mutex::new(()),
        }
    }

    pub fn read(&self) -> ProgressRecord {
        match self.slot.load() {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(record) => record,
                Err(e) => {
                    self.reporter.report(CoreEvent::StorageParseFailed {
                        detail: e.to_string(),
                    });
                    ProgressRecord::default()
                }
            },
            Ok(None) => ProgressRecord::default(),
            Err(e) => {
                self.reporter.report(CoreEvent::StorageReadFailed {
                    detail: format!("{:#}", e),
                });
                ProgressRecord::default()
            }
        }
    }

    pub fn write(&self, record: &ProgressRecord) {
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                self.reporter.report(CoreEvent::StorageWriteFailed {
                    detail: e.to_string(),
                });
                return;
            }
        };
        if let Err(e) = self.slot.store(&raw) {
            self.reporter.report(CoreEvent::StorageWriteFailed {
                detail: format!("{:#}", e),
            });
        }
    }

    /// Single mutation entry point for drill completion: appends the
    /// submission, bumps the total, advances the streak against `today`,
    /// persists, and returns the updated record.
    pub fn append(&self, submission: DrillSubmission, today: NaiveDate) -> ProgressRecord {
        let _guard = self.write_guard.lock().expect("progress store mutex poisoned");

        let mut record = self.read();
        record.drill_submissions.push(submission);
        record.total_drills_completed += 1;
        record.streak = compute_streak(&record.streak, today);

        metrics::DRILL_SUBMISSIONS_TOTAL.inc();
        metrics::STREAK_CURRENT.set(record.streak.current as i64);

        self.write(&record);
        record
    }

    /// Flips the migrated flag. Callers invoke this only after a migration
    /// pass they consider complete.
    pub fn mark_migrated(&self) -> ProgressRecord {
        let _guard = self.write_guard.lock().expect("progress store mutex poisoned");

        let mut record = self.read();
        record.migrated = true;
        self.write(&record);
        record
    }

    /// Discards all history. Explicit reset flows only.
    pub fn clear(&self) {
        let _guard = self.write_guard.lock().expect("progress store mutex poisoned");

        if let Err(e) = self.slot.clear() {
            self.reporter.report(CoreEvent::StorageWriteFailed {
                detail: format!("{:#}", e),
            });
        }
    }

    pub fn has_unmigrated_history(&self) -> bool {
        let record = self.read();
        record.total_drills_completed > 0 && !record.migrated
    }

    /// Health probe for the storage dependency.
    pub fn health(&self) -> Result<()> {
        self.slot.load().map(|_| ())
    }
}
