//! HTTP page fetcher: reqwest for transport, `scraper` to locate the main
//! content, `htmd` to turn it into markdown.
//!
//! No JavaScript rendering; static HTML only.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::config::IngestConfig;

const MAIN_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".post-content",
    ".entry-content",
];

const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "iframe", ".navbar",
    ".sidebar", ".menu", ".ads",
];

/// Fetches pages over HTTP and converts them to markdown.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    max_content_chars: usize,
}

impl HttpPageFetcher {
    pub fn new(config: &IngestConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_content_chars: config.max_content_chars,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<(String, String)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Ingest(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Ingest(format!("HTTP {} for {}", status, url)));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::Ingest(format!("failed to read body: {}", e)))?;

        Ok((final_url, body))
    }

    fn truncate(&self, text: String) -> String {
        if self.max_content_chars == 0 || text.chars().count() <= self.max_content_chars {
            return text;
        }
        text.chars().take(self.max_content_chars).collect()
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let (final_url, html) = self.fetch_html(url).await?;
        let (title, text) = html_to_text(&html);
        debug!(url = %final_url, chars = text.len(), "Fetched page");

        let page = FetchedPage::new(final_url, self.truncate(text));
        Ok(match title {
            Some(title) => page.with_title(title),
            None => page,
        })
    }
}

/// Extract the title and the main content, as markdown, from an HTML page.
pub fn html_to_text(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);
    let title = extract_title(&document);
    let content = extract_main_content(&document);

    let markdown = htmd::convert(&content).unwrap_or_else(|_| {
        Html::parse_fragment(&content)
            .root_element()
            .text()
            .collect::<String>()
    });

    (title, markdown.trim().to_string())
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn extract_main_content(document: &Html) -> String {
    for selector in MAIN_SELECTORS.iter().filter_map(|s| Selector::parse(s).ok()) {
        if let Some(main) = document.select(&selector).next() {
            return main.html();
        }
    }

    match Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next().map(|body| body.html()))
    {
        Some(body) => strip_boilerplate(document, body),
        None => document.html(),
    }
}

fn strip_boilerplate(document: &Html, mut html: String) -> String {
    for selector in BOILERPLATE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
    {
        for element in document.select(&selector) {
            html = html.replace(&element.html(), "");
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_main_content() {
        let html = r#"<html><head><title> Shop </title></head><body>
            <nav>Home | About</nav>
            <main><h1>Reviews</h1><p>Great product</p></main>
            <footer>(c) 2024</footer></body></html>"#;

        let (title, text) = html_to_text(html);
        assert_eq!(title.as_deref(), Some("Shop"));
        assert!(text.contains("Reviews"));
        assert!(text.contains("Great product"));
        assert!(!text.contains("Home | About"));
    }

    #[test]
    fn test_body_fallback_strips_boilerplate() {
        let html = r#"<html><body><nav>menu</nav><p>Body text</p><script>x()</script></body></html>"#;

        let (title, text) = html_to_text(html);
        assert!(title.is_none());
        assert!(text.contains("Body text"));
        assert!(!text.contains("menu"));
        assert!(!text.contains("x()"));
    }

    #[test]
    fn test_truncate() {
        let fetcher = HttpPageFetcher::new(&IngestConfig::new().with_max_content_chars(4)).unwrap();
        assert_eq!(fetcher.truncate("abcdefgh".into()), "abcd");
    }
}
