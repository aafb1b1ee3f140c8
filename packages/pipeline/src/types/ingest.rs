//! Ingestion request types.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Kind of raw content carried by an ingest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Strings,
    Files,
    Urls,
}

/// Request to append raw content to a collection, one entry per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct IngestRequest {
    pub created_object_name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub input_data: Vec<serde_json::Value>,
}

/// How file content is encoded in the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileEncoding {
    #[default]
    Utf8,
    Base64,
}

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileItem {
    #[serde(default = "FileItem::default_filename")]
    pub filename: String,
    pub content: String,
    #[serde(default)]
    pub encoding: FileEncoding,
}

impl FileItem {
    fn default_filename() -> String {
        "unknown_file.txt".to_string()
    }
}

/// A parsed ingest item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestItem {
    Text(String),
    File(FileItem),
    Url(String),
}

impl IngestRequest {
    /// Parse every raw item according to `data_type`.
    ///
    /// All items are parsed before anything is written, so a malformed item
    /// rejects the whole request.
    pub fn items(&self) -> Result<Vec<IngestItem>> {
        self.input_data
            .iter()
            .enumerate()
            .map(|(idx, raw)| parse_item(self.data_type, idx, raw))
            .collect()
    }
}

fn parse_item(data_type: DataType, idx: usize, raw: &serde_json::Value) -> Result<IngestItem> {
    use serde_json::Value;

    match (data_type, raw) {
        (DataType::Strings, Value::String(s)) => Ok(IngestItem::Text(s.clone())),
        (DataType::Strings, other) => Ok(IngestItem::Text(other.to_string())),
        // A bare string is already the file's text
        (DataType::Files, Value::String(s)) => Ok(IngestItem::Text(s.clone())),
        (DataType::Files, other) => serde_json::from_value::<FileItem>(other.clone())
            .map(IngestItem::File)
            .map_err(|e| PipelineError::invalid(format!("input_data[{}] is not a file: {}", idx, e))),
        (DataType::Urls, Value::String(s)) if !s.trim().is_empty() => Ok(IngestItem::Url(s.clone())),
        (DataType::Urls, _) => Err(PipelineError::invalid(format!(
            "input_data[{}] must be a non-empty URL string",
            idx
        ))),
    }
}

/// Result of an ingest call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub object_name: String,
    pub processed: usize,
}

/// A list of URLs given either as an array or a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(untagged)]
pub enum UrlList {
    Joined(String),
    Many(Vec<String>),
}

impl UrlList {
    /// Split into trimmed, non-empty URL strings.
    pub fn into_urls(self) -> Vec<String> {
        let raw = match self {
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            Self::Many(urls) => urls,
        };
        raw.into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect()
    }
}

/// Request for the URL scraping shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ScrapeRequest {
    pub object_name: String,
    pub urls: UrlList,
}

/// Result of a URL scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub object_name: String,
    pub urls_processed: usize,
    /// URLs fetched successfully; failures are still stored as error entries
    pub rows_created: usize,
}
