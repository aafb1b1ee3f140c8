//! Entry reduction and key matching.

use std::collections::HashSet;

use crate::types::{entry::Entry, request::InputMode};

/// Reduce a collection's entries according to its input mode.
///
/// `combine_events` collapses everything into one entry; the other modes
/// pass the list through unchanged (the distinction only matters to the
/// planner).
pub fn reduce(entries: Vec<Entry>, mode: InputMode) -> Vec<Entry> {
    match mode {
        InputMode::CombineEvents => vec![combine_events(&entries)],
        InputMode::UseIndividually | InputMode::MatchKeys => entries,
    }
}

/// Collapse entries into one: values space-joined in order, keys unioned.
///
/// An empty list yields an entry with an empty value and no keys.
pub fn combine_events(entries: &[Entry]) -> Entry {
    let value = entries
        .iter()
        .map(|e| e.value.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Entry {
        key_list: dedup_keys(entries.iter().flat_map(|e| e.key_list.iter())),
        value,
    }
}

/// All `(a, b)` pairs whose key sets intersect, in `(A-order, B-order)`.
pub fn match_entries<'a>(left: &'a [Entry], right: &'a [Entry]) -> Vec<(&'a Entry, &'a Entry)> {
    let right_keys: Vec<HashSet<&str>> = right
        .iter()
        .map(|e| e.key_list.iter().map(String::as_str).collect())
        .collect();

    let mut matches = Vec::new();
    for a in left {
        for (b, b_keys) in right.iter().zip(&right_keys) {
            if a.key_list.iter().any(|k| b_keys.contains(k.as_str())) {
                matches.push((a, b));
            }
        }
    }
    matches
}

/// De-duplicate keys, keeping the first occurrence of each.
pub fn dedup_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|k| seen.insert(k.as_str()))
        .cloned()
        .collect()
}
