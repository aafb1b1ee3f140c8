//! The apply-prompt derivation engine.
//!
//! A derivation reads its input collections, reduces each by its mode, plans
//! the combinations, renders one prompt per combination, calls the generator
//! and appends the generated fields to the output collections.
//!
//! ```text
//! load → reduce → plan → materialize → generate (bounded fan-out) → write (plan order)
//! ```
//!
//! Loading is fail-fast: a missing input aborts before any combination is
//! processed. After that the batch is best-effort; whatever was written
//! before a failure stays written.

pub mod combine;
pub mod materialize;
pub mod plan;
pub mod write;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::traits::{generator::Generator, store::CollectionStore};
use crate::types::{
    config::DerivationConfig,
    request::{CombinationFailure, DerivationOutcome, DerivationRequest, FailurePolicy},
};

pub use combine::{combine_events, match_entries, reduce};
pub use materialize::{materialize, MaterializedPrompt};
pub use plan::{plan, Combination, Member, ReducedInput};
pub use write::{derived_key_list, flatten_value, write_results};

/// Runs derivation requests against a store and a generator.
pub struct Deriver<S: CollectionStore, G: Generator> {
    store: S,
    generator: G,
    config: DerivationConfig,
}

impl<S: CollectionStore, G: Generator> Deriver<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            config: DerivationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DerivationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DerivationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load and reduce every declared input, failing on the first missing one.
    pub async fn load_inputs(&self, request: &DerivationRequest) -> Result<Vec<ReducedInput>> {
        let mut reduced = Vec::with_capacity(request.inputs.len());
        for input in &request.inputs {
            let collection = self.store.get(&input.collection_name).await?;
            reduced.push(ReducedInput::new(
                collection.name,
                input.mode,
                reduce(collection.entries, input.mode),
            ));
        }
        Ok(reduced)
    }

    /// Render every prompt the request would send, without calling the
    /// generator or writing anything.
    pub async fn preview(&self, request: &DerivationRequest) -> Result<Vec<MaterializedPrompt>> {
        request.validate()?;
        let reduced = self.load_inputs(request).await?;
        Ok(plan(&reduced)
            .iter()
            .map(|c| materialize(&request.prompt_string, c))
            .collect())
    }

    /// Run a derivation request.
    #[instrument(
        skip(self, request),
        fields(inputs = request.inputs.len(), outputs = ?request.created_object_names)
    )]
    pub async fn apply(&self, request: &DerivationRequest) -> Result<DerivationOutcome> {
        request.validate()?;
        let outputs = request.output_names();
        let policy = request.failure_policy.unwrap_or(self.config.failure_policy);

        let reduced = self.load_inputs(request).await?;
        let max_concurrency = self.config.max_concurrency.max(1);
        let prompts: Vec<MaterializedPrompt> = plan(&reduced)
            .iter()
            .map(|c| materialize(&request.prompt_string, c))
            .collect();

        info!(
            combinations = prompts.len(),
            max_concurrency,
            policy = ?policy,
            "Applying prompt"
        );

        let mut outcome = DerivationOutcome::new(outputs.clone());
        let generator = &self.generator;
        let fields = outputs.as_slice();

        let mut generated = stream::iter(prompts.into_iter().enumerate())
            .map(|(idx, prompt)| async move {
                let result = generator.generate(&prompt.prompt, fields).await;
                (idx, prompt, result)
            })
            .buffered(max_concurrency);

        while let Some((idx, prompt, result)) = generated.next().await {
            let step = match result {
                Ok(values) => {
                    write_results(&self.store, fields, &values, &prompt.provenance).await
                }
                Err(e) => Err(e),
            };

            match step {
                Ok(written) => {
                    outcome.combinations_processed += 1;
                    outcome.entries_written += written;
                }
                Err(e) if policy == FailurePolicy::Abort => {
                    warn!(
                        combination = idx,
                        processed = outcome.combinations_processed,
                        error = %e,
                        "Combination failed, aborting derivation"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(combination = idx, error = %e, "Combination failed, continuing");
                    outcome.failures.push(CombinationFailure {
                        combination: idx,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = outcome.combinations_processed,
            written = outcome.entries_written,
            failed = outcome.failures.len(),
            "Derivation complete"
        );

        Ok(outcome)
    }
}
