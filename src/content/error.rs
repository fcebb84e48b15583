use thiserror::Error;

/// Reasons a content source could not be turned into analysable text.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Content source is empty")]
    MissingContent,

    #[error("Invalid content type: {0}")]
    UnknownKind(String),

    #[error("Failed to fetch URL: {0}")]
    Fetch(String),

    #[error("Failed to fetch URL: HTTP {0}")]
    HttpStatus(u16),

    #[error("Unable to extract meaningful content. Content length: {0}")]
    TooShort(usize),

    #[error("Content appears to be inaccessible (matched \"{0}\")")]
    NoContent(&'static str),

    #[error("No search results found for \"{0}\"")]
    NoSearchResults(String),

    #[error("Search failed: {0}")]
    Search(String),
}

impl ContentError {
    /// True when the input itself is malformed, as opposed to a source that
    /// was well-formed but yielded nothing usable.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ContentError::InvalidUrl(_) | ContentError::MissingContent | ContentError::UnknownKind(_)
        )
    }

    /// Transport failures and server-side statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ContentError::Fetch(_) => true,
            ContentError::HttpStatus(status) => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
