//! Content acquisition traits for ingestion.
//!
//! - `PageFetcher`: turn a URL into readable text
//! - `TextExtractor`: turn uploaded file bytes into text

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;

/// A fetched and text-converted web page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// Page title if available
    pub title: Option<String>,

    /// Visible text (markdown, links preserved)
    pub text: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            text: text.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Fetches a URL and converts it to text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        (**self).fetch(url).await
    }
}

/// Extracts text from uploaded file bytes.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Arc<T> {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        (**self).extract(filename, bytes)
    }
}
