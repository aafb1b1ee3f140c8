//! Research backend trait (browsing agents).

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// A backend that runs a browsing agent and reports back via webhook.
///
/// `start` only submits the run; the result arrives later as a POST to
/// `webhook_url`.
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn start(&self, prompt: &str, webhook_url: &str) -> Result<()>;
}

#[async_trait]
impl<T: Researcher + ?Sized> Researcher for Arc<T> {
    async fn start(&self, prompt: &str, webhook_url: &str) -> Result<()> {
        (**self).start(prompt, webhook_url).await
    }
}
