//! Core trait abstractions for the pipeline library.
//!
//! These traits define the interfaces that applications implement
//! to provide storage, text generation, research and content fetching.

pub mod fetcher;
pub mod generator;
pub mod researcher;
pub mod store;
