//! Raw content ingestion: strings, uploaded files and web pages.
//!
//! Every ingested item becomes one root entry keyed by a fresh identifier.
//! Items are resolved to text before anything is written, so a malformed
//! item leaves the store untouched. A URL that cannot be fetched is not an
//! error; it is stored as a failure marker so every URL yields one entry.

pub mod http;
pub mod text;

use base64::Engine;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::traits::{
    fetcher::{PageFetcher, TextExtractor},
    store::CollectionStore,
};
use crate::types::{
    entry::Entry,
    ingest::{FileEncoding, FileItem, IngestItem, IngestOutcome, IngestRequest, ScrapeOutcome, ScrapeRequest},
};

pub use http::HttpPageFetcher;
pub use text::PlainTextExtractor;

/// Prepend `https://` when the URL carries no scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Resolves raw items to text and appends them to collections.
pub struct ContentIngester<F: PageFetcher, X: TextExtractor> {
    fetcher: F,
    extractor: X,
}

impl<F: PageFetcher, X: TextExtractor> ContentIngester<F, X> {
    pub fn new(fetcher: F, extractor: X) -> Self {
        Self { fetcher, extractor }
    }

    /// Append every item of `request` to its target collection.
    ///
    /// The collection is created even when there are no items.
    #[instrument(skip(self, store, request), fields(collection = %request.created_object_name, items = request.input_data.len()))]
    pub async fn ingest<S>(&self, store: &S, request: &IngestRequest) -> Result<IngestOutcome>
    where
        S: CollectionStore + ?Sized,
    {
        let items = request.items()?;

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let value = match item {
                IngestItem::Text(text) => text,
                IngestItem::File(file) => self.file_text(&file)?,
                IngestItem::Url(url) => self.fetch_entry(&url).await.0,
            };
            values.push(value);
        }

        let processed = self
            .append_all(store, &request.created_object_name, values)
            .await?;
        info!(processed, "Ingested items");

        Ok(IngestOutcome {
            object_name: request.created_object_name.clone(),
            processed,
        })
    }

    /// Fetch each URL and append one entry per URL.
    #[instrument(skip(self, store, request), fields(collection = %request.object_name))]
    pub async fn scrape_urls<S>(&self, store: &S, request: ScrapeRequest) -> Result<ScrapeOutcome>
    where
        S: CollectionStore + ?Sized,
    {
        let urls = request.urls.into_urls();
        let mut values = Vec::with_capacity(urls.len());
        let mut rows_created = 0;
        for url in &urls {
            let (value, fetched) = self.fetch_entry(url).await;
            if fetched {
                rows_created += 1;
            }
            values.push(value);
        }

        let urls_processed = self.append_all(store, &request.object_name, values).await?;
        info!(urls_processed, rows_created, "Scraped URLs");

        Ok(ScrapeOutcome {
            object_name: request.object_name,
            urls_processed,
            rows_created,
        })
    }

    fn file_text(&self, file: &FileItem) -> Result<String> {
        let bytes = match file.encoding {
            FileEncoding::Utf8 => file.content.as_bytes().to_vec(),
            FileEncoding::Base64 => base64::engine::general_purpose::STANDARD
                .decode(file.content.trim())
                .map_err(|e| {
                    PipelineError::invalid(format!(
                        "file '{}' is not valid base64: {}",
                        file.filename, e
                    ))
                })?,
        };
        self.extractor.extract(&file.filename, &bytes)
    }

    /// Entry text for one URL, and whether the fetch succeeded.
    async fn fetch_entry(&self, raw: &str) -> (String, bool) {
        let url = normalize_url(raw);
        let result = match Url::parse(&url) {
            Ok(_) => self.fetcher.fetch(&url).await,
            Err(e) => Err(PipelineError::Ingest(format!("invalid URL: {}", e))),
        };

        match result {
            Ok(page) => (format!("--- Content from {} ---\n{}", url, page.text), true),
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch URL");
                (format!("--- Failed to fetch from {}: {} ---", url, e), false)
            }
        }
    }

    async fn append_all<S>(&self, store: &S, name: &str, values: Vec<String>) -> Result<usize>
    where
        S: CollectionStore + ?Sized,
    {
        store.create(name).await?;
        let count = values.len();
        for value in values {
            store.append(name, Entry::fresh(value)).await?;
        }
        Ok(count)
    }
}
