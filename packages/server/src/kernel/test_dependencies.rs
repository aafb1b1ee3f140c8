// TestDependencies - mock implementations for testing
//
// Wires pipeline mocks into ServerDeps while keeping handles to them so tests
// can script responses and assert on recorded calls.

use std::sync::Arc;

use pipeline::testing::{MockFetcher, MockGenerator, MockResearcher};
use pipeline::{DerivationConfig, MemoryStore, ResearchConfig};

use super::deps::{ServerDeps, StoreBackend};

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<MemoryStore>,
    pub generator: MockGenerator,
    pub researcher: MockResearcher,
    pub fetcher: MockFetcher,
    pub derivation: DerivationConfig,
    pub research: ResearchConfig,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            generator: MockGenerator::new(),
            researcher: MockResearcher::new(),
            fetcher: MockFetcher::new(),
            derivation: DerivationConfig::default(),
            research: ResearchConfig::default(),
        }
    }

    /// Set a mock generator
    pub fn mock_generator(mut self, generator: MockGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Set a mock researcher
    pub fn mock_researcher(mut self, researcher: MockResearcher) -> Self {
        self.researcher = researcher;
        self
    }

    /// Set a mock page fetcher
    pub fn mock_fetcher(mut self, fetcher: MockFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn derivation_config(mut self, config: DerivationConfig) -> Self {
        self.derivation = config;
        self
    }

    pub fn research_config(mut self, config: ResearchConfig) -> Self {
        self.research = config;
        self
    }

    /// Build server dependencies sharing this builder's mocks and store.
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::in_memory(
            Arc::new(self.generator),
            Arc::new(self.researcher),
            Arc::new(self.fetcher),
        )
        .with_stores(StoreBackend::Memory, self.store.clone(), self.store)
        .with_derivation_config(self.derivation)
        .with_research_config(self.research)
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
