//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the HTTP
//! routes, the tool registry and the scheduled sweep. Every external service
//! sits behind a pipeline trait so tests can swap in memory stores and mocks.

use anyhow::{Context, Result};
use chrono::Duration;
use std::sync::Arc;

use pipeline::{
    ContentIngester, CollectionStore, DerivationConfig, Deriver, DisabledResearcher, Generator,
    HttpPageFetcher, HttpResearcher, IngestConfig, MemoryStore, OpenAIGenerator, PageFetcher,
    PlainTextExtractor, PostgresStore, ResearchConfig, ResearchService, Researcher, TaskStore,
    TextExtractor,
};

use crate::config::Config;

pub type DynDeriver = Deriver<Arc<dyn CollectionStore>, Arc<dyn Generator>>;
pub type DynIngester = ContentIngester<Arc<dyn PageFetcher>, Arc<dyn TextExtractor>>;
pub type DynResearch = ResearchService<Arc<dyn TaskStore>, Arc<dyn Researcher>>;

/// Which storage backend the server is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

/// Server dependencies shared by routes, tools and scheduled tasks
#[derive(Clone)]
pub struct ServerDeps {
    pub backend: StoreBackend,
    pub collections: Arc<dyn CollectionStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub generator: Arc<dyn Generator>,
    pub researcher: Arc<dyn Researcher>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn TextExtractor>,
    pub derivation: DerivationConfig,
    pub research: ResearchConfig,
    pub webhook_base_url: String,
}

impl ServerDeps {
    /// Dependencies over in-memory stores with default settings.
    pub fn in_memory(
        generator: Arc<dyn Generator>,
        researcher: Arc<dyn Researcher>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            backend: StoreBackend::Memory,
            collections: store.clone(),
            tasks: store,
            generator,
            researcher,
            fetcher,
            extractor: Arc::new(PlainTextExtractor),
            derivation: DerivationConfig::default(),
            research: ResearchConfig::default(),
            webhook_base_url: "http://localhost:8080".to_string(),
        }
    }

    /// Build production dependencies from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let (backend, collections, tasks): (StoreBackend, Arc<dyn CollectionStore>, Arc<dyn TaskStore>) =
            match &config.database_url {
                Some(url) => {
                    tracing::info!("Connecting to database...");
                    let store = Arc::new(
                        PostgresStore::new(url)
                            .await
                            .context("Failed to connect to database")?,
                    );
                    tracing::info!("Database connected");
                    (StoreBackend::Postgres, store.clone(), store)
                }
                None => {
                    tracing::warn!("DATABASE_URL not set, using in-memory stores (data is lost on restart)");
                    let store = Arc::new(MemoryStore::new());
                    (StoreBackend::Memory, store.clone(), store)
                }
            };

        let generator: Arc<dyn Generator> = Arc::new(
            OpenAIGenerator::new(config.openai_api_key.clone())
                .with_model(config.openai_model.clone())
                .with_temperature(config.openai_temperature),
        );

        let researcher: Arc<dyn Researcher> = match config.research_backend() {
            Some((url, key)) => Arc::new(HttpResearcher::new(url, key)),
            None => {
                tracing::warn!("RESEARCH_API_URL/RESEARCH_API_KEY not set, research tasks disabled");
                Arc::new(DisabledResearcher)
            }
        };

        let fetcher: Arc<dyn PageFetcher> = Arc::new(
            HttpPageFetcher::new(&IngestConfig::default())
                .context("Failed to create HTTP client")?,
        );

        Ok(Self {
            backend,
            collections,
            tasks,
            generator,
            researcher,
            fetcher,
            extractor: Arc::new(PlainTextExtractor),
            derivation: DerivationConfig::new()
                .with_max_concurrency(config.derivation_concurrency)
                .with_failure_policy(config.failure_policy),
            research: ResearchConfig::new()
                .with_pending_timeout(Duration::minutes(config.research_pending_timeout_minutes))
                .with_retention(Duration::minutes(config.research_retention_minutes)),
            webhook_base_url: config.webhook_base_url.clone(),
        })
    }

    pub fn with_derivation_config(mut self, config: DerivationConfig) -> Self {
        self.derivation = config;
        self
    }

    pub fn with_research_config(mut self, config: ResearchConfig) -> Self {
        self.research = config;
        self
    }

    pub fn with_webhook_base_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_base_url = url.into();
        self
    }

    /// Swap the stores (for Postgres-backed tests).
    pub fn with_stores(
        mut self,
        backend: StoreBackend,
        collections: Arc<dyn CollectionStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        self.backend = backend;
        self.collections = collections;
        self.tasks = tasks;
        self
    }

    pub fn deriver(&self) -> DynDeriver {
        Deriver::new(self.collections.clone(), self.generator.clone()).with_config(self.derivation)
    }

    pub fn ingester(&self) -> DynIngester {
        ContentIngester::new(self.fetcher.clone(), self.extractor.clone())
    }

    pub fn research_service(&self) -> DynResearch {
        ResearchService::new(
            self.tasks.clone(),
            self.researcher.clone(),
            self.webhook_base_url.clone(),
        )
        .with_config(self.research)
    }
}
