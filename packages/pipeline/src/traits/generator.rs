//! Text-generation trait used by the derivation engine.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// Field name → generated value, as returned by the backend.
pub type GeneratedFields = serde_json::Map<String, serde_json::Value>;

/// A text-generation backend.
///
/// Implementations instruct the model to answer with a JSON object whose
/// top-level keys are exactly `fields`, and parse the reply into a map.
/// Any backend or parse failure surfaces as `PipelineError::Generation`.
/// Timeouts are the implementation's responsibility.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str, fields: &[String]) -> Result<GeneratedFields>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn generate(&self, prompt: &str, fields: &[String]) -> Result<GeneratedFields> {
        (**self).generate(prompt, fields).await
    }
}
