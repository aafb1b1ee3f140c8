//! Data types for collections, derivation requests, ingestion and research.

pub mod config;
pub mod entry;
pub mod ingest;
pub mod request;
pub mod research;
