// Collection Pipeline - API Core
//
// HTTP surface over the pipeline library: ingestion, apply-prompt derivation,
// related-collection lookup, research tasks and the typed tool registry.

pub mod common;
pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
