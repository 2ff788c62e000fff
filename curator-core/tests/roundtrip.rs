//! Roundtrip serialisation tests for `curator-core` record types.
//!
//! Each `#[case]` is isolated — no shared state.

use std::collections::BTreeMap;

use curator_core::types::{ExternalIdEntry, Label, OrgRecord};
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn minimal_record() -> OrgRecord {
    OrgRecord {
        name: "Example University".to_string(),
        ..OrgRecord::default()
    }
}

fn full_record() -> OrgRecord {
    let mut external_ids = BTreeMap::new();
    external_ids.insert(
        "ISNI".to_string(),
        ExternalIdEntry {
            preferred: Some("0000 0001 2345 6789".to_string()),
            all: vec![
                "0000 0001 2345 6789".to_string(),
                "0000 0004 9999 0000".to_string(),
            ],
        },
    );
    external_ids.insert(
        "Wikidata".to_string(),
        ExternalIdEntry {
            preferred: Some("Q217810".to_string()),
            all: vec!["Q217810".to_string()],
        },
    );
    OrgRecord {
        name: "Example University".to_string(),
        established: Some(1912),
        wikipedia_url: Some("https://en.wikipedia.org/wiki/Example".to_string()),
        links: vec!["https://example.edu".to_string()],
        types: vec!["Education".to_string()],
        aliases: vec!["Example Uni".to_string()],
        acronyms: vec!["EU".to_string()],
        labels: vec![Label {
            label: "Université Exemple".to_string(),
            iso639: "fr".to_string(),
        }],
        external_ids,
        extra: serde_json::Map::new(),
    }
}

fn unicode_record() -> OrgRecord {
    OrgRecord {
        name: "Universität Zürich — 大学".to_string(),
        aliases: vec!["Üni <>&\"' Zürich".to_string()],
        labels: vec![Label {
            label: "Πανεπιστήμιο".to_string(),
            iso639: "el".to_string(),
        }],
        ..OrgRecord::default()
    }
}

fn empty_vecs_record() -> OrgRecord {
    OrgRecord {
        name: "Empty".to_string(),
        links: vec![],
        types: vec![],
        aliases: vec![],
        acronyms: vec![],
        labels: vec![],
        external_ids: BTreeMap::new(),
        ..OrgRecord::default()
    }
}

// ---------------------------------------------------------------------------
// Parameterised roundtrip test
// ---------------------------------------------------------------------------

#[rstest]
#[case("minimal", minimal_record())]
#[case("all_fields", full_record())]
#[case("unicode_strings", unicode_record())]
#[case("empty_vecs", empty_vecs_record())]
fn record_roundtrip(#[case] label: &str, #[case] record: OrgRecord) {
    let json = serde_json::to_string(&record)
        .unwrap_or_else(|e| panic!("[{label}] serialize failed: {e}"));
    let back: OrgRecord = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("[{label}] deserialize failed: {e}"));
    assert_eq!(record, back, "[{label}] full record");
}

// ---------------------------------------------------------------------------
// External-id entry shapes
// ---------------------------------------------------------------------------

#[rstest]
#[case("with_preferred", Some("Q1".to_string()), vec!["Q1".to_string()])]
#[case("null_preferred", None, vec!["Q1".to_string(), "Q2".to_string()])]
fn external_id_entry_roundtrip(
    #[case] label: &str,
    #[case] preferred: Option<String>,
    #[case] all: Vec<String>,
) {
    let entry = ExternalIdEntry { preferred, all };
    let json = serde_json::to_string(&entry)
        .unwrap_or_else(|e| panic!("[{label}] serialize failed: {e}"));
    let back: ExternalIdEntry = serde_json::from_str(&json)
        .unwrap_or_else(|e| panic!("[{label}] deserialize failed: {e}"));
    assert_eq!(entry, back, "[{label}]");
}
