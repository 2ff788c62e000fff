//! Atomic writer and sync orchestration.
//!
//! ## `atomic_write` — 7-step protocol
//!
//! 1. Render content (already done by caller).
//! 2. SHA-256 hash the rendered content.
//! 3. Load the hash store.
//! 4. Compare with stored hash → skip if identical.
//! 5. Write to `<path>.orchestra.tmp`.
//! 6. Rename to final path (atomic on POSIX).
//! 7. Update hash store entry + save store.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};

use orchestra_core::{
    registry,
    types::{Codebase, CodebaseName, ProjectName},
};
use orchestra_renderer::{AgentKind, Renderer, TemplateContext};

use crate::error::{io_err, SyncError};
use crate::hash_store;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — rendered content matches the stored hash.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write a single rendered file and update the hash store.
///
/// The hash store is loaded before the call; the caller is responsible for
/// saving it after all files for a codebase are processed.
///
/// Returns [`WriteResult`] indicating whether the file was written or skipped.
pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.orchestra.tmp", path.display()));
    atomic_write_with_tmp(path, content, hash_store, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    // Normalise line endings to LF before hashing and writing.
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    // Step 2: hash the normalised content.
    let digest = {
        let mut h = Sha256::new();
        h.update(content.as_bytes());
        hex::encode(h.finalize())
    };

    // Step 4: compare with stored hash.
    let key = path.to_string_lossy().to_string();
    if let Some(stored) = hash_store.get(&key) {
        if stored == &digest {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    // Step 5: ensure parent directory exists, write to .tmp.
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    // Step 6: atomic rename to final path.
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    // Step 7: update hash store entry (caller saves the store).
    hash_store.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// sync_codebase
// ---------------------------------------------------------------------------

pub(crate) fn build_sync_context(
    codebase: &Codebase,
    dry_run: bool,
    store_existed: bool,
    store_synced_at: chrono::DateTime<Utc>,
) -> TemplateContext {
    let mut ctx = TemplateContext::from_codebase(codebase);
    ctx.meta.last_synced = if dry_run {
        None
    } else if store_existed {
        Some(store_synced_at)
    } else {
        None
    };
    ctx
}

pub(crate) fn find_codebase_at(
    home: &Path,
    codebase_name: &str,
) -> Result<(ProjectName, Codebase), SyncError> {
    let name = CodebaseName::from(codebase_name);
    let all = registry::list_codebases_at(home)?;
    all.into_iter()
        .find(|(_, cb)| cb.name == name)
        .ok_or_else(|| {
            SyncError::Registry(orchestra_core::error::RegistryError::RegistryNotFound {
                path: home.join(".orchestra").join("projects").join(codebase_name),
            })
        })
}

/// Outcome of syncing a single codebase.
#[derive(Debug)]
pub struct SyncCodebaseResult {
    pub codebase_name: String,
    pub writes: Vec<WriteResult>,
}

/// Sync all agent files for the named codebase.
///
/// Renders every agent kind and writes with hash-gated atomic writes.
/// Returns a summary of what was written / unchanged.
pub fn sync_codebase(
    codebase_name: &str,
    home: &Path,
    dry_run: bool,
) -> Result<SyncCodebaseResult, SyncError> {
    let sync_started_at = Utc::now();

    // Find the codebase in the registry by scanning all projects.
    let (_, codebase) = find_codebase_at(home, codebase_name)?;

    let renderer = Renderer::new()?;
    let store_path = hash_store::store_path_at(home, codebase_name);
    let store_existed = store_path.exists();
    let mut store = hash_store::load_at(home, codebase_name)?;
    let ctx = build_sync_context(&codebase, dry_run, store_existed, store.synced_at);
    let mut writes = Vec::new();

    for agent in AgentKind::all() {
        let outputs = renderer.render_with_context(&ctx, *agent)?;
        for (path, content) in outputs {
            let result = atomic_write(&path, &content, &mut store.files, dry_run)?;
            writes.push(result);
        }
    }

    // Save the updated hash store (skip in dry-run — no filesystem changes).
    if !dry_run {
        store.synced_at = sync_started_at;
        hash_store::save_at(home, codebase_name, &store)?;
    }

    Ok(SyncCodebaseResult {
        codebase_name: codebase_name.to_string(),
        writes,
    })
}

// ---------------------------------------------------------------------------
// sync_all
// ---------------------------------------------------------------------------

/// Sync all registered codebases.
pub fn sync_all(home: &Path, dry_run: bool) -> Result<Vec<SyncCodebaseResult>, SyncError> {
    let all = registry::list_codebases_at(home)?;
    let mut results = Vec::new();
    for (_project, codebase) in all {
        let name = codebase.name.0.clone();
        let r = sync_codebase(&name, home, dry_run)?;
        results.push(r);
    }
    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
