//! Phase 03 staleness signal detection.
//!
//! Signal precedence:
//! 1. `NeverSynced` (hash store missing or empty)
//! 2. `Stale` (registry changed after `synced_at`, or managed files missing)
//! 3. `Modified` (rendered files changed since last sync hash)
//! 4. `Orphan` (managed files present but not tracked in hash store)
//! 5. `Current`

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use orchestra_core::{
    registry,
    types::{Codebase, ProjectName},
};
use orchestra_renderer::AgentKind;

use crate::{error::io_err, hash_store, SyncError};

/// Phase 03 staleness classification for a codebase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StalenessSignal {
    NeverSynced,
    Current,
    Stale { reason: String },
    Modified { files: Vec<PathBuf> },
    Orphan { files: Vec<PathBuf> },
}

/// Check a codebase for staleness against registry metadata, hash store, and
/// managed file presence.
pub fn check(
    home: &Path,
    project: &ProjectName,
    codebase: &Codebase,
) -> Result<StalenessSignal, SyncError> {
    let managed = managed_paths(codebase);
    let mut managed_keys = BTreeSet::new();
    for path in &managed {
        managed_keys.insert(path.to_string_lossy().to_string());
    }

    // First-run handling: no hash file or no tracked hashes is "never synced",
    // not "stale".
    let store_path = hash_store::store_path_at(home, &codebase.name.0);
    let store_exists = store_path.exists();
    let store = hash_store::load_at(home, &codebase.name.0)?;
    if !store_exists || store.files.is_empty() {
        return Ok(StalenessSignal::NeverSynced);
    }

    let mut missing = Vec::new();
    for path in &managed {
        match std::fs::metadata(path) {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                missing.push(relative_to_codebase(path, codebase));
            }
            Err(err) => return Err(io_err(path, err)),
        }
    }

    if !missing.is_empty() {
        sort_and_dedup_paths(&mut missing);
        return Ok(StalenessSignal::Stale {
            reason: format!(
                "missing {} managed file(s): {}",
                missing.len(),
                preview_files(&missing),
            ),
        });
    }

    // Freshness is based on hash-store sync time, not rendered file mtimes.
    let registry_path = registry::codebase_path_at(home, project, &codebase.name);
    let registry_meta = std::fs::metadata(&registry_path).map_err(|e| io_err(&registry_path, e))?;
    let registry_mtime = registry_meta
        .modified()
        .map_err(|e| io_err(&registry_path, e))?;
    let registry_ts = unix_duration(registry_mtime);
    let synced_ts = datetime_to_unix_duration(store.synced_at);
    if registry_ts > synced_ts {
        return Ok(StalenessSignal::Stale {
            reason: format!(
                "registry changed {} ago",
                format_system_time_age(registry_mtime)
            ),
        });
    }

    let mut modified = Vec::new();
    for path in &managed {
        let key = path.to_string_lossy().to_string();
        let Some(expected_hash) = store.files.get(&key) else {
            continue;
        };
        let current_hash = hash_file(path)?;
        if &current_hash != expected_hash {
            modified.push(relative_to_codebase(path, codebase));
        }
    }
    if !modified.is_empty() {
        sort_and_dedup_paths(&mut modified);
        return Ok(StalenessSignal::Modified { files: modified });
    }

    let mut orphan = Vec::new();
    for path in &managed {
        let key = path.to_string_lossy().to_string();
        if path.exists() && !store.files.contains_key(&key) {
            orphan.push(relative_to_codebase(path, codebase));
        }
    }
    for key in store.files.keys() {
        if managed_keys.contains(key) {
            continue;
        }
        let path = PathBuf::from(key);
        if path.exists() {
            orphan.push(relative_to_codebase(&path, codebase));
        }
    }
    if !orphan.is_empty() {
        sort_and_dedup_paths(&mut orphan);
        return Ok(StalenessSignal::Orphan { files: orphan });
    }

    Ok(StalenessSignal::Current)
}

/// Format age from a filesystem timestamp.
pub fn format_system_time_age(timestamp: SystemTime) -> String {
    let age = SystemTime::now()
        .duration_since(timestamp)
        .unwrap_or_default();
    format_duration(age)
}

/// Format age from a chrono timestamp (hash store `synced_at`).
pub fn format_datetime_age(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let age = now.signed_duration_since(timestamp).num_seconds().max(0) as u64;
    format_seconds(age)
}

fn managed_paths(codebase: &Codebase) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for agent in AgentKind::all() {
        paths.extend(agent.output_paths(&codebase.path));
    }
    paths
}

fn hash_file(path: &Path) -> Result<String, SyncError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let normalized = content.replace("\r\n", "\n");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn unix_duration(timestamp: SystemTime) -> Duration {
    timestamp.duration_since(UNIX_EPOCH).unwrap_or_default()
}

fn datetime_to_unix_duration(timestamp: DateTime<Utc>) -> Duration {
    let secs = timestamp.timestamp().max(0) as u64;
    Duration::new(secs, timestamp.timestamp_subsec_nanos())
}

fn relative_to_codebase(path: &Path, codebase: &Codebase) -> PathBuf {
    path.strip_prefix(&codebase.path)
        .unwrap_or(path)
        .to_path_buf()
}

fn format_duration(duration: Duration) -> String {
    format_seconds(duration.as_secs())
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}

fn sort_and_dedup_paths(paths: &mut Vec<PathBuf>) {
    paths.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    paths.dedup();
}

fn preview_files(paths: &[PathBuf]) -> String {
    let mut shown: Vec<String> = paths
        .iter()
        .take(3)
        .map(|p| p.display().to_string())
        .collect();
    if paths.len() > shown.len() {
        shown.push(format!("+{} more", paths.len() - shown.len()));
    }
    shown.join(", ")
}
