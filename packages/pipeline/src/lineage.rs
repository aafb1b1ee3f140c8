//! Related-collection lookup through shared provenance keys.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::store::CollectionStore;
use crate::types::entry::{Collection, Entry};

/// Keys one related collection shares with the primary collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedKeys {
    pub object_name: String,
    pub shared_keys: Vec<String>,
    pub shared_key_count: usize,
}

/// A collection together with every other collection linked to it by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedReport {
    pub object_name: String,
    pub data: Vec<Entry>,
    pub related_objects: Vec<Collection>,
    pub total_objects: usize,
    pub shared_keys_summary: Vec<SharedKeys>,
    pub primary_object_keys: Vec<String>,
}

/// Gather `name` and every other collection sharing at least one key with it.
///
/// Fails with `NotFound` when `name` does not exist. A collection with no
/// keys has no related collections.
#[tracing::instrument(skip(store))]
pub async fn related_collections<S>(store: &S, name: &str) -> Result<RelatedReport>
where
    S: CollectionStore + ?Sized,
{
    let primary = store.get(name).await?;
    let primary_keys: IndexSet<&str> = primary.keys().collect();

    let mut related = Vec::new();
    let mut summary = Vec::new();

    if !primary_keys.is_empty() {
        for other in store.list().await? {
            if other.name == primary.name {
                continue;
            }

            let shared: IndexSet<&str> = other
                .keys()
                .filter(|k| primary_keys.contains(k))
                .collect();
            if shared.is_empty() {
                continue;
            }

            summary.push(SharedKeys {
                object_name: other.name.clone(),
                shared_key_count: shared.len(),
                shared_keys: shared.into_iter().map(str::to_string).collect(),
            });
            related.push(other);
        }
    }

    tracing::debug!(related = related.len(), "Resolved related collections");

    Ok(RelatedReport {
        object_name: primary.name.clone(),
        total_objects: related.len() + 1,
        primary_object_keys: primary_keys.into_iter().map(str::to_string).collect(),
        data: primary.entries.clone(),
        related_objects: related,
        shared_keys_summary: summary,
    })
}
