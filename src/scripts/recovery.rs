//! Recovery of a JSON object from noisy model output.
//!
//! Strategies run in a fixed order and the first one that yields a value of
//! the requested shape wins. A value that parses as JSON but lacks a required
//! key counts as a failure of that strategy.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response was truncated or incomplete")]
    Truncated,

    #[error("No fenced code block")]
    NoFencedBlock,

    #[error("No JSON object delimiters")]
    NoObject,

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

type Strategy<T> = fn(&str) -> Result<T, ParseError>;

/// Parses `raw` into `T`, trying each recovery strategy in turn.
///
/// On failure the error of the last strategy is returned.
pub fn recover_json<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    if looks_truncated(raw) {
        return Err(ParseError::Truncated);
    }

    let strategies: [(&str, Strategy<T>); 3] = [
        ("fenced_block", fenced_block),
        ("brace_scan", brace_scan),
        ("whole_string", whole_string),
    ];

    let mut last_error = ParseError::NoObject;
    for (name, strategy) in strategies {
        match strategy(raw) {
            Ok(value) => {
                debug!(strategy = name, "Recovered JSON from model response");
                return Ok(value);
            }
            Err(e) => {
                debug!(strategy = name, error = %e, "JSON recovery strategy failed");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

fn looks_truncated(raw: &str) -> bool {
    let trimmed = raw.trim_end();
    !raw.contains('}') || trimmed.ends_with("...") || trimmed.ends_with('\u{2026}')
}

/// Contents of the first fenced block, without its language tag.
fn fenced_contents(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let after_open = &text[start..];
    let body_start = after_open
        .find('\n')
        .filter(|newline| {
            after_open[..*newline]
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        })
        .map(|newline| newline + 1)
        .unwrap_or(0);
    let body = &after_open[body_start..];
    let end = body.find(FENCE)?;
    Some(body[..end].trim())
}

/// Removes a dangling opening or closing fence.
fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix(FENCE) {
        cleaned = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim();
    }
    if let Some(rest) = cleaned.strip_suffix(FENCE) {
        cleaned = rest.trim();
    }
    cleaned
}

/// Text with fences removed, as the later strategies see it.
fn cleaned(raw: &str) -> &str {
    strip_fences(fenced_contents(raw).unwrap_or(raw))
}

fn fenced_block<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let contents = fenced_contents(raw).ok_or(ParseError::NoFencedBlock)?;
    Ok(serde_json::from_str(contents)?)
}

fn brace_scan<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let text = cleaned(raw);
    let first = text.find('{').ok_or(ParseError::NoObject)?;
    let last = text.rfind('}').ok_or(ParseError::NoObject)?;
    if last <= first {
        return Err(ParseError::NoObject);
    }
    Ok(serde_json::from_str(&text[first..=last])?)
}

fn whole_string<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    Ok(serde_json::from_str(cleaned(raw))?)
}
