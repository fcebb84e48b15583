//! Search fallback for `search` content sources.
//!
//! Neither backing is part of a stable contract: the static provider serves
//! curated stories and the feed provider does a best-effort RSS lookup.

mod feed_provider;
mod static_provider;

pub use feed_provider::{parse_feed_items, FeedSearchProvider};
pub use static_provider::StaticSearchProvider;

use crate::config::{SearchEngine, SearchSettings};
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Renders results as the labeled block handed to the content analyzer.
pub fn format_search_block(query: &str, results: &[SearchResult]) -> String {
    let entries = results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            format!(
                "{}. {}\nSource: {}\nDetails: {}\n",
                index + 1,
                result.title,
                result.url,
                result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "SEARCH RESULTS FOR: \"{}\"\n\n{}\nThis information represents current news developments \
         that should be used for generating topical radio content.",
        query, entries
    )
}

pub fn provider_from_settings(settings: &SearchSettings) -> Result<Arc<dyn SearchProvider>> {
    Ok(match settings.engine {
        SearchEngine::Static => Arc::new(StaticSearchProvider::default()),
        SearchEngine::Feed => Arc::new(FeedSearchProvider::new(
            &settings.feed_url_template,
            settings.max_results,
        )?),
    })
}
