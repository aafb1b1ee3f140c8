//! Configuration types for the derivation engine, research tasks and
//! ingestion.

use chrono::Duration;
use std::time::Duration as StdDuration;

use super::request::FailurePolicy;

/// Configuration for apply-prompt derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationConfig {
    /// Maximum generator calls in flight for one request.
    ///
    /// Results are always written back in plan order regardless of this
    /// setting; `1` processes combinations strictly one at a time.
    pub max_concurrency: usize,

    /// Default policy when a combination fails
    pub failure_policy: FailurePolicy,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl DerivationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fan-out bound (clamped to at least 1).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Configuration for research task expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchConfig {
    /// A pending task older than this is reported as `timeout`
    pub pending_timeout: Duration,

    /// Finished tasks are purged this long after completion
    pub retention: Duration,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            pending_timeout: Duration::minutes(30),
            retention: Duration::hours(2),
        }
    }
}

impl ResearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pending_timeout(mut self, timeout: Duration) -> Self {
        self.pending_timeout = timeout;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }
}

/// Configuration for URL fetching during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// User agent sent with page requests
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: StdDuration,

    /// Maximum characters kept from one page (0 = unlimited)
    pub max_content_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; PipelineBot/1.0)".to_string(),
            timeout: StdDuration::from_secs(30),
            max_content_chars: 0,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }
}
