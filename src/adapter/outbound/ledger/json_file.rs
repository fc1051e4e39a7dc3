//! JSON-file backed [`SeenLedger`].
//!
//! The whole set is rewritten on every addition as
//! `{"seen_ids": [...]}` using [`write_atomic`], so a crash mid-write leaves
//! the previous file intact.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::adapter::outbound::atomic::write_atomic;
use crate::error::{PersistenceError, Result};
use crate::port::SeenLedger;

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default, alias = "seen_job_ids")]
    seen_ids: Vec<String>,
}

struct State {
    ids: BTreeSet<String>,
    /// Set when the last write failed; the next `mark_seen` flushes even
    /// for an already-known id.
    dirty: bool,
}

/// Durable seen-set stored as a single JSON document.
pub struct JsonFileLedger {
    path: PathBuf,
    state: Mutex<State>,
}

impl JsonFileLedger {
    /// Open the ledger at `path`, loading any existing contents.
    ///
    /// A missing or malformed file yields an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let ledger = Self {
            path: path.into(),
            state: Mutex::new(State {
                ids: BTreeSet::new(),
                dirty: false,
            }),
        };
        ledger.load();
        ledger
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge the on-disk contents into memory and return the number of ids
    /// read.
    ///
    /// Never fails: read and decode errors are logged and the in-memory set
    /// is left untouched.
    pub fn load(&self) -> usize {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No ledger file yet");
                return 0;
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to read ledger");
                return 0;
            }
        };

        let file: LedgerFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed ledger file, keeping in-memory state"
                );
                return 0;
            }
        };

        let loaded = file.seen_ids.len();
        let mut state = self.state.lock();
        state.ids.extend(
            file.seen_ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
        );
        info!(
            path = %self.path.display(),
            loaded,
            total = state.ids.len(),
            "Loaded seen posting ids"
        );
        loaded
    }

    fn persist(&self, ids: &BTreeSet<String>) -> Result<()> {
        let file = LedgerFile {
            seen_ids: ids.iter().cloned().collect(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|source| PersistenceError::Encode {
            what: "ledger",
            source,
        })?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

impl SeenLedger for JsonFileLedger {
    fn is_new(&self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            warn!("Posting without an id treated as already seen");
            return false;
        }
        !self.state.lock().ids.contains(id)
    }

    fn mark_seen(&self, id: &str) -> Result<()> {
        let id = id.trim();
        if id.is_empty() {
            warn!("Refusing to record a blank posting id");
            return Ok(());
        }

        // Held across the write so concurrent callers never persist a stale
        // snapshot over a newer one.
        let mut state = self.state.lock();
        let inserted = state.ids.insert(id.to_string());
        if !inserted && !state.dirty {
            return Ok(());
        }

        match self.persist(&state.ids) {
            Ok(()) => {
                state.dirty = false;
                debug!(posting_id = id, total = state.ids.len(), "Marked posting seen");
                Ok(())
            }
            Err(e) => {
                state.dirty = true;
                error!(
                    posting_id = id,
                    path = %self.path.display(),
                    error = %e,
                    "Failed to persist ledger"
                );
                Err(e)
            }
        }
    }

    fn len(&self) -> usize {
        self.state.lock().ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_never_new() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonFileLedger::open(dir.path().join("seen.json"));

        assert!(!ledger.is_new(""));
        assert!(!ledger.is_new("   "));
        assert!(ledger.is_new("abc"));
    }

    #[test]
    fn blank_ids_are_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let ledger = JsonFileLedger::open(&path);

        ledger.mark_seen(" ").unwrap();

        assert!(ledger.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn file_lists_ids_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let ledger = JsonFileLedger::open(&path);

        ledger.mark_seen("b").unwrap();
        ledger.mark_seen("a").unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "seen_ids": ["a", "b"] }));
    }

    #[test]
    fn legacy_key_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        fs::write(&path, r#"{"seen_job_ids": ["old-1", "old-2"]}"#).unwrap();

        let ledger = JsonFileLedger::open(&path);

        assert_eq!(ledger.len(), 2);
        assert!(!ledger.is_new("old-1"));
    }

    #[test]
    fn reload_of_malformed_file_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.json");
        let ledger = JsonFileLedger::open(&path);
        ledger.mark_seen("kept").unwrap();

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(ledger.load(), 0);

        assert!(!ledger.is_new("kept"));
    }

    #[test]
    fn failed_write_still_advances_memory_and_retries_later() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();
        let ledger = JsonFileLedger::open(blocker.join("seen.json"));

        assert!(ledger.mark_seen("abc").is_err());
        assert!(!ledger.is_new("abc"));

        // Still failing, but the dirty flag forces another attempt.
        assert!(ledger.mark_seen("abc").is_err());
    }
}
