//! Store error-message, atomic-write-safety, and unknown-field fidelity
//! tests for the JSON directory store.

use assert_fs::prelude::*;
use curator_core::{
    store::{JsonDirStore, RecordStore},
    types::{OrgRecord, RegistryId},
    StoreError,
};
use predicates::prelude::predicate;
use std::fs;

fn id() -> RegistryId {
    RegistryId::from("012xzy7a9")
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_record_returns_not_found() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = JsonDirStore::new(root.path());
    let err = store.load(&id()).unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("record not found"));
    assert!(err.to_string().contains("012xzy7a9.json"));
}

#[test]
fn load_corrupt_json_returns_parse_error_with_path() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    fs::write(root.path().join("012xzy7a9.json"), b"{\"name\": [unclosed").expect("write");

    let store = JsonDirStore::new(root.path());
    let err = store.load(&id()).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(msg.contains("012xzy7a9.json"), "must contain file path, got: {msg}");
    let source_msg = match &err {
        StoreError::Parse { source, .. } => source.to_string(),
        _ => unreachable!(),
    };
    assert!(!source_msg.is_empty(), "serde_json must provide error context");
}

#[test]
fn load_wrong_type_json_returns_parse_error() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    fs::write(root.path().join("012xzy7a9.json"), b"[1, 2, 3]").expect("write");

    let store = JsonDirStore::new(root.path());
    let err = store.load(&id()).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn store_creates_root_and_cleans_up_tmp() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let nested = root.path().join("records");
    let store = JsonDirStore::new(&nested);

    let record = OrgRecord {
        name: "Example University".to_string(),
        ..OrgRecord::default()
    };
    store.store(&id(), &record).expect("store");

    root.child("records/012xzy7a9.json")
        .assert(predicate::path::exists());
    let tmp = nested.join("012xzy7a9.json.tmp");
    assert!(!tmp.exists(), ".tmp must be removed after successful store");
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = JsonDirStore::new(root.path());
    let record = OrgRecord {
        name: "Original".to_string(),
        ..OrgRecord::default()
    };
    store.store(&id(), &record).expect("store");

    let path = store.record_path(&id());
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    let current_bytes = fs::read(&path).expect("read after crash");
    assert_eq!(original_bytes, current_bytes, "original must be unchanged after crash");
    assert!(tmp.exists(), ".tmp orphan must exist (crash = no cleanup)");
}

// ---------------------------------------------------------------------------
// 3. Unknown-field fidelity across a store/load cycle
// ---------------------------------------------------------------------------

#[test]
fn unknown_registry_fields_survive_store_and_load() {
    let root = assert_fs::TempDir::new().expect("tempdir");
    let store = JsonDirStore::new(root.path());

    let raw = serde_json::json!({
        "id": "https://ror.org/012xzy7a9",
        "name": "Example University",
        "established": null,
        "wikipedia_url": null,
        "links": [],
        "types": ["Education"],
        "aliases": [],
        "acronyms": [],
        "labels": [],
        "external_ids": {},
        "addresses": [{"city": "Lyon", "geonames_city": {"id": 2996944}}],
        "relationships": [{"type": "Child", "id": "https://ror.org/0abcdef00"}],
        "status": "active"
    });
    let record: OrgRecord = serde_json::from_value(raw.clone()).expect("deserialize");
    store.store(&id(), &record).expect("store");

    let reloaded = store.load(&id()).expect("load");
    let back = serde_json::to_value(&reloaded).expect("serialize");
    assert_eq!(back["addresses"], raw["addresses"]);
    assert_eq!(back["relationships"], raw["relationships"]);
    assert_eq!(back["status"], raw["status"]);
}
