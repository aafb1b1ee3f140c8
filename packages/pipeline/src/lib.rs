//! Collection Ingestion and Prompt-Driven Derivation Library
//!
//! Named collections hold provenance-tagged text entries. Raw content is
//! ingested as root entries; new collections are derived from existing ones
//! by running a templated prompt over combinations of their entries, with
//! every derived entry carrying the keys of everything it was built from.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pipeline::{Deriver, DerivationRequest, InputMode, MemoryStore};
//! use pipeline::testing::MockGenerator;
//!
//! let deriver = Deriver::new(MemoryStore::new(), MockGenerator::new());
//!
//! let request = DerivationRequest::new("Summarize: {reviews}")
//!     .input("reviews", InputMode::UseIndividually)
//!     .output("summary");
//! let outcome = deriver.apply(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Store, generator, researcher and fetcher abstractions
//! - [`types`] - Entries, collections, requests and research tasks
//! - [`derive`] - The apply-prompt engine (combine, plan, materialize, write)
//! - [`ingest`] - Strings, files and web pages into root entries
//! - [`research`] - Browsing-agent tasks with webhook and expiry
//! - [`lineage`] - Related collections through shared keys
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`ai`] - Generator prompt framing; OpenAI backend behind `openai`
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod derive;
pub mod error;
pub mod ingest;
pub mod lineage;
pub mod research;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use derive::Deriver;
pub use error::{PipelineError, Result};
pub use ingest::{ContentIngester, HttpPageFetcher, PlainTextExtractor};
pub use lineage::{related_collections, RelatedReport, SharedKeys};
pub use research::{DisabledResearcher, HttpResearcher, ResearchService};
pub use stores::MemoryStore;
pub use traits::{
    fetcher::{FetchedPage, PageFetcher, TextExtractor},
    generator::{GeneratedFields, Generator},
    researcher::Researcher,
    store::{CollectionStore, TaskStore},
};
pub use types::{
    config::{DerivationConfig, IngestConfig, ResearchConfig},
    entry::{Collection, Entry},
    ingest::{DataType, IngestOutcome, IngestRequest, ScrapeOutcome, ScrapeRequest, UrlList},
    request::{
        CombinationFailure, DerivationOutcome, DerivationRequest, FailurePolicy, InputMode,
        InputSpec,
    },
    research::{
        ResearchRequest, ResearchTask, SweepReport, TaskFilter, TaskStatus, WebhookAck,
        WebhookPayload,
    },
};

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

#[cfg(feature = "openai")]
pub use ai::OpenAIGenerator;
