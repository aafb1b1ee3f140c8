use anyhow::{Context, Result};
use dotenvy::dotenv;
use pipeline::FailurePolicy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; in-memory stores when unset
    pub database_url: Option<String>,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub derivation_concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub research_api_url: Option<String>,
    pub research_api_key: Option<String>,
    /// Public base URL the research backend posts webhooks to
    pub webhook_base_url: String,
    pub research_pending_timeout_minutes: i64,
    pub research_retention_minutes: i64,
    pub research_sweep_cron: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port: u16 = non_empty("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            port,
            openai_api_key: non_empty("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4.1-mini".to_string()),
            openai_temperature: non_empty("OPENAI_TEMPERATURE")
                .unwrap_or_else(|| "0.2".to_string())
                .parse()
                .context("OPENAI_TEMPERATURE must be a number")?,
            derivation_concurrency: non_empty("DERIVATION_CONCURRENCY")
                .unwrap_or_else(|| "1".to_string())
                .parse()
                .context("DERIVATION_CONCURRENCY must be a positive integer")?,
            failure_policy: non_empty("FAILURE_POLICY")
                .unwrap_or_else(|| "abort".to_string())
                .parse()
                .context("FAILURE_POLICY must be 'abort' or 'continue'")?,
            research_api_url: non_empty("RESEARCH_API_URL"),
            research_api_key: non_empty("RESEARCH_API_KEY"),
            webhook_base_url: non_empty("WEBHOOK_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            research_pending_timeout_minutes: non_empty("RESEARCH_PENDING_TIMEOUT_MINUTES")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .context("RESEARCH_PENDING_TIMEOUT_MINUTES must be an integer")?,
            research_retention_minutes: non_empty("RESEARCH_RETENTION_MINUTES")
                .unwrap_or_else(|| "120".to_string())
                .parse()
                .context("RESEARCH_RETENTION_MINUTES must be an integer")?,
            research_sweep_cron: non_empty("RESEARCH_SWEEP_CRON")
                .unwrap_or_else(|| "0 */30 * * * *".to_string()),
        })
    }

    /// Research is enabled only when both backend URL and key are set.
    pub fn research_backend(&self) -> Option<(&str, &str)> {
        match (&self.research_api_url, &self.research_api_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_model, "gpt-4.1-mini");
        assert_eq!(config.derivation_concurrency, 1);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.webhook_base_url, "http://localhost:8080");
        assert_eq!(config.research_pending_timeout_minutes, 30);
        assert_eq!(config.research_retention_minutes, 120);
        assert!(config.research_backend().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "9000"),
            ("FAILURE_POLICY", "continue"),
            ("DERIVATION_CONCURRENCY", "4"),
            ("RESEARCH_API_URL", "https://agents.example"),
            ("RESEARCH_API_KEY", "rk"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.derivation_concurrency, 4);
        assert_eq!(config.webhook_base_url, "http://localhost:9000");
        assert_eq!(
            config.research_backend(),
            Some(("https://agents.example", "rk"))
        );
    }

    #[test]
    fn test_missing_api_key() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_bad_policy() {
        let result = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("FAILURE_POLICY", "retry"),
        ]));
        assert!(result.is_err());
    }
}
