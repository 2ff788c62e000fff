//! Domain types for registry organization records.
//!
//! All types are serializable/deserializable via serde + serde_json.
//! Fields the patch engine never touches round-trip through the flattened
//! `extra` map so a load/store cycle preserves the full registry document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry ids in operator CSVs may carry the canonical URL prefix.
const ID_URL_PREFIX: &str = "https://ror.org/";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed registry identifier for one organization record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub String);

impl RegistryId {
    /// Build an id from operator input, stripping the URL prefix if present.
    ///
    /// `https://ror.org/012xzy7a9` and `012xzy7a9` yield the same id.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let bare = trimmed.strip_prefix(ID_URL_PREFIX).unwrap_or(trimmed);
        Self(bare.to_owned())
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RegistryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RegistryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A display label in a specific language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub label: String,
    /// ISO 639-1 language code (e.g. `"fr"`).
    pub iso639: String,
}

/// Values held under one external identifier scheme.
///
/// Entries written by this tool keep `preferred` a member of `all` and
/// `all` non-empty for as long as the scheme key exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdEntry {
    pub preferred: Option<String>,
    pub all: Vec<String>,
}

/// One organization record as fetched from the registry API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OrgRecord {
    pub name: String,
    pub established: Option<i64>,
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub acronyms: Vec<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub external_ids: BTreeMap<String, ExternalIdEntry>,
    /// Registry fields outside the editable vocabulary (id, addresses,
    /// relationships, status, …) — preserved verbatim across edits.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
