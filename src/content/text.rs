//! Cleanup and acceptance checks applied to extracted page text.

use super::error::ContentError;
use lazy_static::lazy_static;
use regex::Regex;

pub const MAX_CONTENT_CHARS: usize = 10_000;
pub const MIN_CONTENT_CHARS: usize = 30;

const TRUNCATION_MARKER: &str = "...";

/// Phrases whose presence means the page is an error, paywall or login wall.
const NO_CONTENT_INDICATORS: &[&str] = &[
    "404",
    "not found",
    "page not found",
    "access denied",
    "subscription required",
    "login required",
    "content not available",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NOISE_PHRASES: Vec<Regex> = [
        r"(?i)Share\s+Tweet\s+Email",
        r"(?i)Advertisement",
        r"(?i)Subscribe\s+to",
        r"(?i)Read\s+more",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect();
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Collapses whitespace, strips noise phrases, truncates and rejects text
/// that is too short or looks like an error page.
pub fn finalize_text(raw: &str) -> Result<String, ContentError> {
    let mut content = collapse_whitespace(raw);
    for noise in NOISE_PHRASES.iter() {
        content = noise.replace_all(&content, "").into_owned();
    }
    let mut content = collapse_whitespace(&content);

    if content.chars().count() > MAX_CONTENT_CHARS {
        content = content.chars().take(MAX_CONTENT_CHARS).collect::<String>() + TRUNCATION_MARKER;
    }

    let length = content.chars().count();
    if length < MIN_CONTENT_CHARS {
        return Err(ContentError::TooShort(length));
    }

    let lower = content.to_lowercase();
    if let Some(indicator) = NO_CONTENT_INDICATORS
        .iter()
        .find(|indicator| lower.contains(*indicator))
    {
        return Err(ContentError::NoContent(indicator));
    }

    Ok(content)
}
