//! Writing generated fields back as derived entries.

use serde_json::Value;
use uuid::Uuid;

use crate::derive::combine::dedup_keys;
use crate::error::Result;
use crate::traits::{generator::GeneratedFields, store::CollectionStore};
use crate::types::entry::Entry;

/// Flatten a generated value into entry text.
///
/// Strings are stored verbatim; everything else (lists, objects, numbers)
/// as JSON text.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Key list for an entry derived from `provenance`: the de-duplicated keys
/// followed by `fresh`.
pub fn derived_key_list(provenance: &[String], fresh: &str) -> Vec<String> {
    let mut keys = dedup_keys(provenance);
    keys.retain(|k| k != fresh);
    keys.push(fresh.to_string());
    keys
}

/// Append one entry per output that the generator answered.
///
/// Outputs missing from `fields` are skipped. All entries written for one
/// combination share a single freshly minted identifier. Returns the number
/// of entries appended.
pub async fn write_results<S>(
    store: &S,
    outputs: &[String],
    fields: &GeneratedFields,
    provenance: &[String],
) -> Result<usize>
where
    S: CollectionStore + ?Sized,
{
    let fresh = Uuid::new_v4().to_string();
    let key_list = derived_key_list(provenance, &fresh);
    let mut written = 0;

    for output in outputs {
        let Some(value) = fields.get(output) else {
            tracing::debug!(output = %output, "generator omitted output field, skipping");
            continue;
        };

        store.create(output).await?;
        store
            .append(output, Entry::new(key_list.clone(), flatten_value(value)))
            .await?;
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use serde_json::json;

    fn fields(value: Value) -> GeneratedFields {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_flatten_value() {
        assert_eq!(flatten_value(&json!("plain")), "plain");
        assert_eq!(flatten_value(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(flatten_value(&json!({"x": 1})), r#"{"x":1}"#);
        assert_eq!(flatten_value(&json!(3)), "3");
    }

    #[test]
    fn test_derived_key_list_appends_fresh() {
        let keys = derived_key_list(&["k1".into(), "k2".into(), "k1".into()], "new");
        assert_eq!(keys, vec!["k1", "k2", "new"]);
    }

    #[tokio::test]
    async fn test_write_results_shares_fresh_key_across_outputs() {
        let store = MemoryStore::new();
        let outputs = vec!["title".to_string(), "tags".to_string()];
        let generated = fields(json!({"title": "Hi", "tags": ["a", "b"]}));

        let written = write_results(&store, &outputs, &generated, &["k1".into()])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let title = store.get("title").await.unwrap();
        let tags = store.get("tags").await.unwrap();
        assert_eq!(title.entries[0].value, "Hi");
        assert_eq!(tags.entries[0].value, r#"["a","b"]"#);

        assert_eq!(title.entries[0].key_list.len(), 2);
        assert_eq!(title.entries[0].key_list[0], "k1");
        assert_eq!(title.entries[0].key_list, tags.entries[0].key_list);
    }

    #[tokio::test]
    async fn test_write_results_skips_missing_fields() {
        let store = MemoryStore::new();
        let outputs = vec!["summary".to_string(), "sentiment".to_string()];
        let generated = fields(json!({"summary": "fine"}));

        let written = write_results(&store, &outputs, &generated, &[]).await.unwrap();
        assert_eq!(written, 1);
        assert!(store.find("sentiment").await.unwrap().is_none());
    }
}
