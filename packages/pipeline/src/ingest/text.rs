//! Default file-to-text extraction.

use crate::error::Result;
use crate::traits::fetcher::TextExtractor;

/// Decodes uploaded bytes as UTF-8, replacing invalid sequences.
///
/// Binary document formats are stored as whatever text survives decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(bytes);
        if matches!(text, std::borrow::Cow::Owned(_)) {
            tracing::debug!(filename = %filename, "File contained invalid UTF-8, decoded lossily");
        }
        Ok(text.into_owned())
    }
}
