//! Content normalization.
//!
//! Turns a user supplied content source (pasted text, uploaded document
//! text, a page URL or a search query) into one plain-text blob for the
//! analyzers.

mod error;
mod fetcher;
mod html_extract;
mod retry_policy;
mod text;

pub use error::ContentError;
pub use fetcher::{PageFetcher, ReqwestPageFetcher};
pub use html_extract::{extract_main_text, ExtractedText, ExtractionStrategy};
pub use retry_policy::RetryPolicy;
pub use text::{finalize_text, MAX_CONTENT_CHARS, MIN_CONTENT_CHARS};

use crate::search::{format_search_block, SearchProvider};
use crate::server::metrics::record_content_extraction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Url,
    Search,
    Upload,
    Manual,
}

impl ContentKind {
    /// Parses the `contentType` request value. Absent means `manual`.
    pub fn parse(value: Option<&str>) -> Result<Self, ContentError> {
        let value = match value.map(str::trim) {
            None | Some("") => return Ok(ContentKind::Manual),
            Some(v) => v,
        };
        match value.to_ascii_lowercase().as_str() {
            "url" => Ok(ContentKind::Url),
            "search" => Ok(ContentKind::Search),
            "upload" => Ok(ContentKind::Upload),
            "manual" => Ok(ContentKind::Manual),
            _ => Err(ContentError::UnknownKind(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Url => "url",
            ContentKind::Search => "search",
            ContentKind::Upload => "upload",
            ContentKind::Manual => "manual",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSource {
    pub value: String,
    pub kind: ContentKind,
}

impl ContentSource {
    pub fn new(value: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// Only absolute `http` and `https` URLs are accepted.
pub fn validate_url(raw: &str) -> Result<Url, ContentError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|_| ContentError::InvalidUrl(trimmed.to_string()))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(ContentError::InvalidUrl(trimmed.to_string())),
    }
}

pub struct ContentNormalizer {
    fetcher: Arc<dyn PageFetcher>,
    search: Arc<dyn SearchProvider>,
}

impl ContentNormalizer {
    pub fn new(fetcher: Arc<dyn PageFetcher>, search: Arc<dyn SearchProvider>) -> Self {
        Self { fetcher, search }
    }

    /// Produces the analysable text for a content source.
    ///
    /// Text kinds pass through unchanged once they are known to be non-empty.
    pub async fn normalize(&self, source: &ContentSource) -> Result<String, ContentError> {
        let result = match source.kind {
            ContentKind::Manual | ContentKind::Upload => {
                if source.value.trim().is_empty() {
                    Err(ContentError::MissingContent)
                } else {
                    Ok(source.value.clone())
                }
            }
            ContentKind::Url => self.extract_url(&source.value).await,
            ContentKind::Search => self.search_block(&source.value).await,
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_validation() => "invalid",
            Err(_) => "failed",
        };
        record_content_extraction(source.kind.as_str(), outcome);
        result
    }

    /// Fetches a page and returns its cleaned main text.
    pub async fn extract_url(&self, raw_url: &str) -> Result<String, ContentError> {
        let url = validate_url(raw_url)?;
        let html = self.fetcher.fetch(url.as_str()).await?;
        let extracted = extract_main_text(&html);
        debug!(
            url = %url,
            strategy = ?extracted.strategy,
            raw_chars = extracted.text.chars().count(),
            "Extracted page text"
        );
        finalize_text(&extracted.text).inspect_err(|e| {
            warn!(url = %url, error = %e, "Extracted page text rejected");
        })
    }

    async fn search_block(&self, query: &str) -> Result<String, ContentError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ContentError::MissingContent);
        }
        let results = self
            .search
            .search(query)
            .await
            .map_err(|e| ContentError::Search(e.to_string()))?;
        if results.is_empty() {
            return Err(ContentError::NoSearchResults(query.to_string()));
        }
        Ok(format_search_block(query, &results))
    }
}
