//! Hash store — SHA-256-based idempotency tracking for synced files.
//!
//! Persists a `HashStoreFile` JSON document at
//! `<home>/.orchestra/hashes/<codebase_name>.json`.
//! Writes use the same atomic `.tmp` + rename pattern as the registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// In-memory hash store: maps relative file path strings to their last
/// synced SHA-256 hex digest.
pub type HashStore = HashMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    pub synced_at: DateTime<Utc>,
    pub files: HashStore,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HashStoreCompat {
    Structured(HashStoreStructuredCompat),
    Legacy(HashStore),
}

#[derive(Debug, Deserialize)]
struct HashStoreStructuredCompat {
    pub synced_at: Option<DateTime<Utc>>,
    pub files: HashStore,
}

/// Path to the hash store JSON for a given codebase, rooted at `home`.
///
/// `~/.orchestra/hashes/<codebase_name>.json`
pub fn store_path_at(home: &Path, codebase_name: &str) -> PathBuf {
    home.join(".orchestra")
        .join("hashes")
        .join(format!("{codebase_name}.json"))
}

/// Load the hash store for `codebase_name`.
///
/// Returns an empty store if the file does not yet exist.
pub fn load_at(home: &Path, codebase_name: &str) -> Result<HashStoreFile, SyncError> {
    let path = store_path_at(home, codebase_name);
    if !path.exists() {
        return Ok(HashStoreFile {
            synced_at: Utc::now(),
            files: HashMap::new(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    match serde_json::from_str::<HashStoreCompat>(&contents)? {
        HashStoreCompat::Structured(store) => Ok(HashStoreFile {
            synced_at: store.synced_at.unwrap_or_else(Utc::now),
            files: store.files,
        }),
        HashStoreCompat::Legacy(files) => Ok(HashStoreFile {
            synced_at: Utc::now(),
            files,
        }),
    }
}

/// Save the hash store for `codebase_name` atomically.
///
/// Writes to `<path>.tmp` then renames to `<path>`.
pub fn save_at(home: &Path, codebase_name: &str, store: &HashStoreFile) -> Result<(), SyncError> {
    let path = store_path_at(home, codebase_name);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid hash store path"),
        ));
    };

    // Ensure the hashes directory exists.
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
