//! # curator-core
//!
//! Domain types and record persistence for the curator batch editor.
//!
//! - [`types`] — newtypes and the organization record model
//! - [`error`] — [`StoreError`]
//! - [`store`] — the [`RecordStore`] seam plus the JSON-directory and
//!   in-memory implementations

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{JsonDirStore, MemoryStore, RecordStore};
pub use types::{ExternalIdEntry, Label, OrgRecord, RegistryId};
