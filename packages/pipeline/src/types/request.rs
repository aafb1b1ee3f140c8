//! Derivation request and outcome types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{PipelineError, Result};

/// How one input collection participates in a derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Collapse every entry into a single synthesized entry.
    CombineEvents,

    /// Use each entry on its own (cross product with other inputs).
    UseIndividually,

    /// Use each entry on its own, joined to other inputs by shared keys.
    MatchKeys,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CombineEvents => "combine_events",
            Self::UseIndividually => "use_individually",
            Self::MatchKeys => "match_keys",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named input of a derivation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct InputSpec {
    /// Name of the collection to read
    #[serde(rename = "input_object_name", alias = "collection_name")]
    pub collection_name: String,

    /// Participation mode
    pub mode: InputMode,
}

impl InputSpec {
    pub fn new(collection_name: impl Into<String>, mode: InputMode) -> Self {
        Self {
            collection_name: collection_name.into(),
            mode,
        }
    }
}

/// What to do when a single combination fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed combination and surface its error.
    /// Combinations already written stay written.
    #[default]
    Abort,

    /// Record the failure and keep processing the remaining combinations.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(PipelineError::Config(format!(
                "unknown failure policy '{}', expected 'abort' or 'continue'",
                other
            ))),
        }
    }
}

/// A request to derive new collections from existing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DerivationRequest {
    /// Output collections; each is written when the generator returns a
    /// field of the same name
    pub created_object_names: Vec<String>,

    /// Template with `{collection_name}` placeholders
    pub prompt_string: String,

    /// Inputs in declared order
    pub inputs: Vec<InputSpec>,

    /// Per-request override of the configured failure policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicy>,
}

impl DerivationRequest {
    pub fn new(prompt_string: impl Into<String>) -> Self {
        Self {
            created_object_names: Vec::new(),
            prompt_string: prompt_string.into(),
            inputs: Vec::new(),
            failure_policy: None,
        }
    }

    /// Add an input.
    pub fn input(mut self, collection_name: impl Into<String>, mode: InputMode) -> Self {
        self.inputs.push(InputSpec::new(collection_name, mode));
        self
    }

    /// Add an output collection name.
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.created_object_names.push(name.into());
        self
    }

    /// Override the failure policy for this request.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Output names with duplicates removed, first occurrence wins.
    pub fn output_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.created_object_names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }

    /// Reject requests the planner cannot give a meaning to.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PipelineError::invalid("at least one input is required"));
        }
        if self.created_object_names.is_empty() {
            return Err(PipelineError::invalid(
                "at least one output collection name is required",
            ));
        }
        if let Some(blank) = self
            .created_object_names
            .iter()
            .find(|name| name.trim().is_empty())
        {
            return Err(PipelineError::invalid(format!(
                "output collection name '{}' is blank",
                blank
            )));
        }

        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.collection_name.as_str()) {
                return Err(PipelineError::invalid(format!(
                    "input '{}' is declared more than once",
                    input.collection_name
                )));
            }
        }

        Ok(())
    }
}

/// A combination that failed under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationFailure {
    /// Zero-based index in plan order
    pub combination: usize,

    /// Error message
    pub error: String,
}

/// Result of an apply-prompt call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationOutcome {
    /// Combinations that were generated and written successfully
    pub combinations_processed: usize,

    /// Output collection names from the request
    pub created_objects: Vec<String>,

    /// Entries appended across all output collections
    pub entries_written: usize,

    /// Failed combinations (only populated under `continue`)
    #[serde(default)]
    pub failures: Vec<CombinationFailure>,
}

impl DerivationOutcome {
    pub fn new(created_objects: Vec<String>) -> Self {
        Self {
            created_objects,
            ..Default::default()
        }
    }
}
