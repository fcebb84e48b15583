//! Best-effort RSS lookup.

use super::{SearchProvider, SearchResult};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

const FEED_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SNIPPET_CHARS: usize = 500;

pub struct FeedSearchProvider {
    client: Client,
    url_template: String,
    max_results: usize,
}

impl FeedSearchProvider {
    /// `url_template` must contain a `{query}` placeholder.
    pub fn new(url_template: &str, max_results: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent("IntroFuse/1.0")
            .timeout(FEED_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
            max_results,
        })
    }

    fn feed_url(&self, query: &str) -> String {
        self.url_template
            .replace("{query}", &urlencoding::encode(query))
    }
}

#[async_trait]
impl SearchProvider for FeedSearchProvider {
    fn name(&self) -> &str {
        "feed"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = self.feed_url(query);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to request feed {}", url))?;

        if !response.status().is_success() {
            bail!("Feed request failed with status {}", response.status());
        }

        let body = response.text().await.context("Failed to read feed body")?;
        let results = parse_feed_items(&body, self.max_results)?;
        debug!(query, results = results.len(), "Feed search completed");
        Ok(results)
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    description: String,
    source: String,
}

impl ItemBuilder {
    fn build(self, feed_title: &str) -> Option<SearchResult> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return None;
        }
        let snippet: String = strip_markup(&self.description)
            .chars()
            .take(MAX_SNIPPET_CHARS)
            .collect();
        let source = match self.source.trim() {
            "" => feed_title.trim().to_string(),
            s => s.to_string(),
        };
        Some(SearchResult {
            snippet: if snippet.is_empty() { title.clone() } else { snippet },
            title,
            url: self.link.trim().to_string(),
            source,
        })
    }
}

/// Feed descriptions are usually escaped HTML.
fn strip_markup(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    parsed
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collects up to `max` `<item>` entries from an RSS document.
pub fn parse_feed_items(xml: &str, max: usize) -> Result<Vec<SearchResult>> {
    let mut reader = Reader::from_str(xml);
    let mut results = Vec::new();
    let mut feed_title = String::new();
    let mut item: Option<ItemBuilder> = None;
    let mut current_field: Option<String> = None;

    loop {
        let event = reader.read_event().context("Malformed feed XML")?;
        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "item" {
                    item = Some(ItemBuilder::default());
                }
                current_field = Some(name);
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(result) = item.take().and_then(|b| b.build(&feed_title)) {
                        results.push(result);
                        if results.len() >= max {
                            break;
                        }
                    }
                }
                current_field = None;
            }
            Event::Text(ref e) => {
                let text = e.unescape().context("Invalid text in feed")?;
                append_field(&mut item, &mut feed_title, current_field.as_deref(), &text);
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                append_field(&mut item, &mut feed_title, current_field.as_deref(), &text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(results)
}

fn append_field(
    item: &mut Option<ItemBuilder>,
    feed_title: &mut String,
    field: Option<&str>,
    text: &str,
) {
    match (item.as_mut(), field) {
        (Some(item), Some("title")) => item.title.push_str(text),
        (Some(item), Some("link")) => item.link.push_str(text),
        (Some(item), Some("description")) => item.description.push_str(text),
        (Some(item), Some("source")) => item.source.push_str(text),
        (None, Some("title")) => feed_title.push_str(text),
        _ => {}
    }
}
