//! Combination planning.
//!
//! Three policies, chosen from the declared inputs:
//!
//! - one input: one combination per reduced entry
//! - several inputs, none `match_keys`: full cross product, last input
//!   varying fastest
//! - several inputs, at least one `match_keys`: pairwise key join over every
//!   pair `(i, j)`, `i < j`, that involves a `match_keys` input; the other
//!   inputs contribute their first reduced entry
//!
//! The pairwise join does not de-duplicate across pairs. With three or more
//! `match_keys` inputs the same assignment can be produced by several pairs
//! and is emitted once per pair.

use crate::derive::combine::match_entries;
use crate::types::{entry::Entry, request::InputMode};

/// An input collection after reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedInput {
    pub name: String,
    pub mode: InputMode,
    pub entries: Vec<Entry>,
}

impl ReducedInput {
    pub fn new(name: impl Into<String>, mode: InputMode, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            mode,
            entries,
        }
    }
}

/// One input's contribution to a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'a> {
    pub input: &'a str,
    pub entry: &'a Entry,
}

/// One assignment of entries to inputs, fed to one generation call.
///
/// Members are kept in declared input order. An input with no reduced
/// entries may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'a> {
    members: Vec<Member<'a>>,
}

impl<'a> Combination<'a> {
    pub fn members(&self) -> &[Member<'a>] {
        &self.members
    }

    /// Entry assigned to `input`, if present.
    pub fn get(&self, input: &str) -> Option<&'a Entry> {
        self.members
            .iter()
            .find(|m| m.input == input)
            .map(|m| m.entry)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Plan every combination for the given inputs, in deterministic order.
pub fn plan(inputs: &[ReducedInput]) -> Vec<Combination<'_>> {
    match inputs {
        [] => Vec::new(),
        [single] => single
            .entries
            .iter()
            .map(|entry| Combination {
                members: vec![Member {
                    input: &single.name,
                    entry,
                }],
            })
            .collect(),
        _ if inputs.iter().any(|i| i.mode == InputMode::MatchKeys) => plan_matched(inputs),
        _ => plan_cross_product(inputs),
    }
}

fn plan_cross_product(inputs: &[ReducedInput]) -> Vec<Combination<'_>> {
    let mut partials: Vec<Vec<Member<'_>>> = vec![Vec::new()];

    for input in inputs {
        partials = partials
            .into_iter()
            .flat_map(|prefix| {
                input.entries.iter().map(move |entry| {
                    let mut members = prefix.clone();
                    members.push(Member {
                        input: &input.name,
                        entry,
                    });
                    members
                })
            })
            .collect();
    }

    partials
        .into_iter()
        .map(|members| Combination { members })
        .collect()
}

fn plan_matched(inputs: &[ReducedInput]) -> Vec<Combination<'_>> {
    let mut combinations = Vec::new();

    for i in 0..inputs.len() {
        for j in (i + 1)..inputs.len() {
            let (left, right) = (&inputs[i], &inputs[j]);
            if left.mode != InputMode::MatchKeys && right.mode != InputMode::MatchKeys {
                continue;
            }

            for (a, b) in match_entries(&left.entries, &right.entries) {
                let members = inputs
                    .iter()
                    .enumerate()
                    .filter_map(|(k, input)| {
                        let entry = if k == i {
                            a
                        } else if k == j {
                            b
                        } else {
                            input.entries.first()?
                        };
                        Some(Member {
                            input: &input.name,
                            entry,
                        })
                    })
                    .collect();
                combinations.push(Combination { members });
            }
        }
    }

    combinations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keys: &[&str], value: &str) -> Entry {
        Entry::new(keys.iter().copied(), value)
    }

    fn values<'a>(combination: &Combination<'a>) -> Vec<(&'a str, &'a str)> {
        combination
            .members()
            .iter()
            .map(|m| (m.input, m.entry.value.as_str()))
            .collect()
    }

    #[test]
    fn test_single_input_preserves_order() {
        let inputs = vec![ReducedInput::new(
            "reviews",
            InputMode::UseIndividually,
            vec![entry(&["k1"], "Great"), entry(&["k2"], "Bad")],
        )];

        let plan = plan(&inputs);
        assert_eq!(plan.len(), 2);
        assert_eq!(values(&plan[0]), vec![("reviews", "Great")]);
        assert_eq!(values(&plan[1]), vec![("reviews", "Bad")]);
    }

    #[test]
    fn test_single_match_keys_input_enumerates() {
        let inputs = vec![ReducedInput::new(
            "names",
            InputMode::MatchKeys,
            vec![entry(&["u1"], "Ann"), entry(&["u2"], "Bob")],
        )];
        assert_eq!(plan(&inputs).len(), 2);
    }

    #[test]
    fn test_cross_product_last_input_fastest() {
        let inputs = vec![
            ReducedInput::new(
                "a",
                InputMode::UseIndividually,
                vec![entry(&["a1"], "a1"), entry(&["a2"], "a2")],
            ),
            ReducedInput::new(
                "b",
                InputMode::CombineEvents,
                vec![entry(&["b1"], "b1")],
            ),
            ReducedInput::new(
                "c",
                InputMode::UseIndividually,
                vec![entry(&["c1"], "c1"), entry(&["c2"], "c2"), entry(&["c3"], "c3")],
            ),
        ];

        let plan = plan(&inputs);
        assert_eq!(plan.len(), 2 * 1 * 3);
        assert_eq!(values(&plan[0]), vec![("a", "a1"), ("b", "b1"), ("c", "c1")]);
        assert_eq!(values(&plan[1]), vec![("a", "a1"), ("b", "b1"), ("c", "c2")]);
        assert_eq!(values(&plan[3]), vec![("a", "a2"), ("b", "b1"), ("c", "c1")]);
    }

    #[test]
    fn test_cross_product_with_empty_input_is_empty() {
        let inputs = vec![
            ReducedInput::new("a", InputMode::UseIndividually, vec![entry(&["a1"], "a1")]),
            ReducedInput::new("b", InputMode::UseIndividually, vec![]),
        ];
        assert!(plan(&inputs).is_empty());
    }

    #[test]
    fn test_match_keys_joins_on_shared_keys() {
        let inputs = vec![
            ReducedInput::new(
                "names",
                InputMode::MatchKeys,
                vec![entry(&["u1"], "Ann"), entry(&["u2"], "Bob")],
            ),
            ReducedInput::new(
                "emails",
                InputMode::MatchKeys,
                vec![entry(&["u1"], "ann@x.org"), entry(&["u3"], "cat@x.org")],
            ),
        ];

        let plan = plan(&inputs);
        assert_eq!(plan.len(), 1);
        assert_eq!(
            values(&plan[0]),
            vec![("names", "Ann"), ("emails", "ann@x.org")]
        );
    }

    #[test]
    fn test_match_keys_fills_other_inputs_with_first_entry() {
        let inputs = vec![
            ReducedInput::new(
                "context",
                InputMode::CombineEvents,
                vec![entry(&["c"], "all context")],
            ),
            ReducedInput::new("names", InputMode::MatchKeys, vec![entry(&["u1"], "Ann")]),
            ReducedInput::new(
                "emails",
                InputMode::UseIndividually,
                vec![entry(&["u1"], "ann@x.org")],
            ),
        ];

        // Pairs involving `names`: (context, names) shares nothing,
        // (names, emails) matches on u1.
        let plan = plan(&inputs);
        assert_eq!(plan.len(), 1);
        assert_eq!(
            values(&plan[0]),
            vec![
                ("context", "all context"),
                ("names", "Ann"),
                ("emails", "ann@x.org")
            ]
        );
    }

    #[test]
    fn test_match_keys_omits_empty_other_inputs() {
        let inputs = vec![
            ReducedInput::new("names", InputMode::MatchKeys, vec![entry(&["u1"], "Ann")]),
            ReducedInput::new("emails", InputMode::MatchKeys, vec![entry(&["u1"], "a@x")]),
            ReducedInput::new("notes", InputMode::UseIndividually, vec![]),
        ];

        let plan = plan(&inputs);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].len(), 2);
        assert!(plan[0].get("notes").is_none());
    }

    #[test]
    fn test_match_keys_skips_pairs_without_match_mode() {
        let inputs = vec![
            ReducedInput::new("a", InputMode::UseIndividually, vec![entry(&["k"], "a")]),
            ReducedInput::new("b", InputMode::UseIndividually, vec![entry(&["k"], "b")]),
            ReducedInput::new("m", InputMode::MatchKeys, vec![entry(&["z"], "m")]),
        ];

        // (a, b) shares k but neither is match_keys; pairs with m never match.
        assert!(plan(&inputs).is_empty());
    }

    #[test]
    fn test_three_match_keys_inputs_repeat_per_pair() {
        let inputs = vec![
            ReducedInput::new("a", InputMode::MatchKeys, vec![entry(&["k"], "a")]),
            ReducedInput::new("b", InputMode::MatchKeys, vec![entry(&["k"], "b")]),
            ReducedInput::new("c", InputMode::MatchKeys, vec![entry(&["k"], "c")]),
        ];

        // (a,b), (a,c), (b,c) each produce the same full assignment.
        let plan = plan(&inputs);
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|c| c == &plan[0]));
    }
}
