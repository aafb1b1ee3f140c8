//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the pipeline library
//! without making real generation, research or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{PipelineError, Result};
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::{GeneratedFields, Generator},
    researcher::Researcher,
    store::CollectionStore,
};
use crate::types::entry::{Collection, Entry};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCall {
    pub prompt: String,
    pub fields: Vec<String>,
}

/// A mock generator with scripted replies.
///
/// Prompts without a scripted reply get one string per requested field:
/// `"{field} of: {prompt}"`. Clones share scripts and call history.
#[derive(Clone, Default)]
pub struct MockGenerator {
    responses: Arc<RwLock<HashMap<String, GeneratedFields>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<GeneratorCall>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `prompt` with the fields of `response` (must be a JSON object).
    pub fn with_response(self, prompt: impl Into<String>, response: serde_json::Value) -> Self {
        let fields = match response {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = GeneratedFields::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        write(&self.responses).insert(prompt.into(), fields);
        self
    }

    /// Fail every call with `prompt`.
    pub fn with_failure(self, prompt: impl Into<String>, error: impl Into<String>) -> Self {
        write(&self.failures).insert(prompt.into(), error.into());
        self
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        read(&self.calls).clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        read(&self.calls).iter().map(|c| c.prompt.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        read(&self.calls).len()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, fields: &[String]) -> Result<GeneratedFields> {
        write(&self.calls).push(GeneratorCall {
            prompt: prompt.to_string(),
            fields: fields.to_vec(),
        });

        if let Some(error) = read(&self.failures).get(prompt) {
            return Err(PipelineError::Generation(error.clone()));
        }

        if let Some(response) = read(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(fields
            .iter()
            .map(|f| {
                (
                    f.clone(),
                    serde_json::Value::String(format!("{} of: {}", f, prompt)),
                )
            })
            .collect())
    }
}

/// Record of a research run submitted to the mock researcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchCall {
    pub prompt: String,
    pub webhook_url: String,
}

/// A mock research backend that records submissions.
#[derive(Clone, Default)]
pub struct MockResearcher {
    failure: Option<String>,
    calls: Arc<RwLock<Vec<ResearchCall>>>,
}

impl MockResearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every submission with `error`.
    pub fn failing(mut self, error: impl Into<String>) -> Self {
        self.failure = Some(error.into());
        self
    }

    pub fn calls(&self) -> Vec<ResearchCall> {
        read(&self.calls).clone()
    }
}

#[async_trait]
impl Researcher for MockResearcher {
    async fn start(&self, prompt: &str, webhook_url: &str) -> Result<()> {
        write(&self.calls).push(ResearchCall {
            prompt: prompt.to_string(),
            webhook_url: webhook_url.to_string(),
        });

        match &self.failure {
            Some(error) => Err(PipelineError::Research(error.clone())),
            None => Ok(()),
        }
    }
}

/// A mock page fetcher serving canned pages.
///
/// Unknown URLs fail with an ingest error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, FetchedPage>>>,
    failures: Arc<RwLock<HashMap<String, String>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        write(&self.pages).insert(url.clone(), FetchedPage::new(url, text));
        self
    }

    pub fn with_failure(self, url: impl Into<String>, error: impl Into<String>) -> Self {
        write(&self.failures).insert(url.into(), error.into());
        self
    }

    /// URLs requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        read(&self.fetched).clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        write(&self.fetched).push(url.to_string());

        if let Some(error) = read(&self.failures).get(url) {
            return Err(PipelineError::Ingest(error.clone()));
        }

        read(&self.pages)
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Ingest(format!("no mock page for {}", url)))
    }
}

/// Build a collection from `(keys, value)` pairs.
pub fn collection(name: &str, entries: &[(&[&str], &str)]) -> Collection {
    entries
        .iter()
        .fold(Collection::new(name), |c, (keys, value)| {
            c.with_entry(Entry::new(keys.iter().copied(), *value))
        })
}

/// Create `collection` in `store` and append its entries in order.
pub async fn seed<S>(store: &S, collection: &Collection) -> Result<()>
where
    S: CollectionStore + ?Sized,
{
    store.create(&collection.name).await?;
    for entry in &collection.entries {
        store.append(&collection.name, entry.clone()).await?;
    }
    Ok(())
}
