//! HTTP client for the browsing-agent backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::traits::researcher::Researcher;

#[derive(Serialize)]
struct RunTaskRequest<'a> {
    prompt: &'a str,
    webhook_url: &'a str,
}

/// Submits research runs to `{base_url}/run/tasks`.
#[derive(Clone)]
pub struct HttpResearcher {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpResearcher {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl Researcher for HttpResearcher {
    async fn start(&self, prompt: &str, webhook_url: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/run/tasks", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&RunTaskRequest {
                prompt,
                webhook_url,
            })
            .send()
            .await
            .map_err(|e| PipelineError::Research(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Research(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        debug!(webhook_url = %webhook_url, "Research run submitted");
        Ok(())
    }
}
