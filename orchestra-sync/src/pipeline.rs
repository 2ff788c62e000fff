//! Shared sync pipeline entrypoint used by CLI and daemon.

use std::path::Path;

use crate::{sync_all, sync_codebase, SyncCodebaseResult, SyncError};

/// Scope for a sync pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncScope {
    /// Sync every registered codebase.
    All,
    /// Sync a single named codebase.
    Codebase(String),
}

/// Run the sync pipeline for a scope.
///
/// This is the canonical sync entrypoint for both `orchestra sync` and the
/// Phase 04 daemon processor.
pub fn run(
    home: &Path,
    scope: SyncScope,
    dry_run: bool,
) -> Result<Vec<SyncCodebaseResult>, SyncError> {
    match scope {
        SyncScope::All => sync_all(home, dry_run),
        SyncScope::Codebase(name) => Ok(vec![sync_codebase(&name, home, dry_run)?]),
    }
}
