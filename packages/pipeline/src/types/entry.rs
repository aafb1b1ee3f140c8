//! Entries and collections.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single provenance-tagged value within a collection.
///
/// `key_list` holds the opaque identifiers of every source entry that
/// contributed to this value. `value` is always flat text; structured
/// content is stored as JSON-encoded text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Provenance identifiers, in the order they were accumulated
    pub key_list: Vec<String>,

    /// Flattened value
    pub value: String,
}

impl Entry {
    /// Create an entry from an explicit key list.
    pub fn new(
        key_list: impl IntoIterator<Item = impl Into<String>>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key_list: key_list.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }

    /// Create a root entry keyed by a single freshly minted identifier.
    pub fn fresh(value: impl Into<String>) -> Self {
        Self {
            key_list: vec![Uuid::new_v4().to_string()],
            value: value.into(),
        }
    }

    /// Whether this entry shares at least one key with `other`.
    pub fn shares_key_with(&self, other: &Entry) -> bool {
        self.key_list.iter().any(|k| other.key_list.contains(k))
    }
}

/// A named, ordered list of entries.
///
/// Serialized with the wire names used by the HTTP surface
/// (`object_name` / `data`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique collection name
    #[serde(rename = "object_name")]
    pub name: String,

    /// Entries in append order
    #[serde(rename = "data", default)]
    pub entries: Vec<Entry>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry (builder style, for fixtures).
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every key referenced by any entry (may repeat).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|e| e.key_list.iter().map(String::as_str))
    }
}
