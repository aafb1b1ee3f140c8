//! Prompt materialization.

use crate::derive::combine::dedup_keys;
use crate::derive::plan::Combination;

/// A prompt ready for the generator, with the provenance it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedPrompt {
    pub prompt: String,

    /// De-duplicated union of every member's keys, first occurrence wins
    pub provenance: Vec<String>,
}

/// Substitute each member's value for its `{input_name}` placeholder.
///
/// The template is scanned once, left to right, so substituted values are
/// never re-scanned. At each `{` the longest member name that completes a
/// placeholder wins. Placeholders naming no member are left as-is.
pub fn materialize(template: &str, combination: &Combination<'_>) -> MaterializedPrompt {
    let mut members: Vec<_> = combination.members().to_vec();
    members.sort_by(|a, b| b.input.len().cmp(&a.input.len()));

    let mut prompt = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let hit = members.iter().find(|m| {
            after
                .strip_prefix(m.input)
                .is_some_and(|tail| tail.starts_with('}'))
        });

        match hit {
            Some(member) => {
                prompt.push_str(&member.entry.value);
                rest = &after[member.input.len() + 1..];
            }
            None => {
                prompt.push('{');
                rest = after;
            }
        }
    }
    prompt.push_str(rest);

    let provenance = dedup_keys(
        combination
            .members()
            .iter()
            .flat_map(|m| m.entry.key_list.iter()),
    );

    MaterializedPrompt { prompt, provenance }
}
