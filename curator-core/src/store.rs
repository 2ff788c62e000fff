//! Record persistence.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   <registry_id>.json   (one pretty-printed document per record)
//! ```
//!
//! Writes use a `.tmp` sibling + rename so a crash mid-write never leaves a
//! half-written record behind. The `.tmp` is always in the same directory as
//! the target (same filesystem — no EXDEV).
//!
//! [`RecordStore`] is the seam the patch engine mutates through; tests run
//! against [`MemoryStore`], the CLI against [`JsonDirStore`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{io_err, StoreError};
use crate::types::{OrgRecord, RegistryId};

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Load/store access to one record's persisted representation.
///
/// Not assumed atomic or lockable across processes; each record is
/// exclusively owned for the duration of its directive sequence.
pub trait RecordStore {
    fn load(&self, id: &RegistryId) -> Result<OrgRecord, StoreError>;
    fn store(&self, id: &RegistryId, record: &OrgRecord) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON directory store
// ---------------------------------------------------------------------------

/// One `<id>.json` file per record under a root directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<registry_id>.json` — pure, no I/O.
    pub fn record_path(&self, id: &RegistryId) -> PathBuf {
        self.root.join(format!("{}.json", id.0))
    }
}

impl RecordStore for JsonDirStore {
    fn load(&self, id: &RegistryId) -> Result<OrgRecord, StoreError> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(StoreError::RecordNotFound { path });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
    }

    fn store(&self, id: &RegistryId, record: &OrgRecord) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| io_err(&self.root, e))?;
        let path = self.record_path(id);
        let tmp = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, e));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Mutex-held map of records, for engine and pipeline tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, OrgRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a record, bypassing the trait.
    pub fn insert(&self, id: &RegistryId, record: OrgRecord) {
        self.records
            .lock()
            .expect("record map poisoned")
            .insert(id.0.clone(), record);
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, id: &RegistryId) -> Result<OrgRecord, StoreError> {
        self.records
            .lock()
            .expect("record map poisoned")
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound {
                path: PathBuf::from(format!("{}.json", id.0)),
            })
    }

    fn store(&self, id: &RegistryId, record: &OrgRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("record map poisoned")
            .insert(id.0.clone(), record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
