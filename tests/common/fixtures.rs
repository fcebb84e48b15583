//! Test fixtures: a deterministic LLM and a small HTML site to extract from

#![allow(dead_code)]

use super::constants::*;
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use introfuse_server::llm::{
    CompletionOptions, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Solar farm opens</title><script>var tracking = true;</script></head>
<body>
    <header><nav>Home | World | Science | Sports</nav></header>
    <article>
        <h1>Lisbon opens its first floating solar farm</h1>
        <p>The 12,000-panel installation on the Alqueva reservoir will power
        roughly 4,000 homes, officials said on Tuesday.</p>
        <div class="advertisement">Buy one get one free</div>
        <p>Advertisement Engineers expect the panels to run cooler on the water.</p>
    </article>
    <footer>Copyright Example News</footer>
</body>
</html>"#;

const MAIN_HTML: &str = r#"<html><body>
    <aside>Trending now</aside>
    <main>
        <h2>TOI-715 b</h2>
        <p>Astronomers confirmed an Earth-sized planet 137 light-years away, orbiting
        a small red dwarf inside the habitable zone where liquid water could exist.</p>
    </main>
</body></html>"#;

const SHORT_HTML: &str = "<html><body><article><p>Too short.</p></article></body></html>";

const SOFT_404_HTML: &str = r#"<html><body><main>
    <h1>Page not found</h1>
    <p>The story you were looking for has moved or never existed at all.</p>
</main></body></html>"#;

/// Request counters for the fixture pages whose answer depends on history.
#[derive(Clone, Default)]
pub struct SiteHits {
    pub flaky: Arc<AtomicUsize>,
    pub missing: Arc<AtomicUsize>,
}

impl SiteHits {
    pub fn flaky(&self) -> usize {
        self.flaky.load(Ordering::SeqCst)
    }

    pub fn missing(&self) -> usize {
        self.missing.load(Ordering::SeqCst)
    }
}

/// Routes of the fixture news site.
pub fn fixture_site_router(hits: SiteHits) -> Router {
    let flaky_hits = hits.flaky.clone();
    let missing_hits = hits.missing.clone();

    Router::new()
        .route(ARTICLE_PATH, get(|| async { Html(ARTICLE_HTML) }))
        .route(MAIN_PATH, get(|| async { Html(MAIN_HTML) }))
        .route(SHORT_PATH, get(|| async { Html(SHORT_HTML) }))
        .route(SOFT_404_PATH, get(|| async { Html(SOFT_404_HTML) }))
        .route(
            BROKEN_PATH,
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            FLAKY_PATH,
            get(move || {
                let hits = flaky_hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, "try again").into_response()
                    } else {
                        Html(ARTICLE_HTML).into_response()
                    }
                }
            }),
        )
        .route(
            MISSING_PATH,
            get(move || {
                let hits = missing_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::NOT_FOUND, "gone")
                }
            }),
        )
}

/// Body of a generate request with the standard song fields.
pub fn generate_body(content_source: &str, content_type: &str) -> Value {
    json!({
        "contentSource": content_source,
        "contentType": content_type,
        "artist": TEST_ARTIST,
        "songTitle": TEST_SONG_TITLE,
        "selectedStyle": TEST_STYLE,
    })
}

fn reply(content: String) -> CompletionResponse {
    CompletionResponse {
        content,
        finish_reason: FinishReason::Stop,
        usage: None,
    }
}

/// Answers each of the three pipeline prompts with well-formed JSON.
///
/// The content analysis summary repeats the analyzed text, so facts from
/// the source survive into the response.
#[derive(Default)]
pub struct ScriptedLlm {
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        let body = if prompt.starts_with("Analyze the song") {
            json!({
                "emotional_tone": "Romantic and hopeful",
                "themes": ["Young love", "Defiance"],
                "mood": "Uplifting",
                "meaning": "Love that refuses to give up",
                "genre": "Country pop",
                "era": "2000s",
                "key_elements": ["Key change"]
            })
        } else if prompt.starts_with("Analyze the following content") {
            let text = prompt
                .lines()
                .find_map(|line| line.strip_prefix("Content: "))
                .unwrap_or("");
            json!({
                "summary": text,
                "key_points": [text],
                "tone": "Curious",
                "topics": ["News"],
                "relevance_score": "7"
            })
        } else {
            // Wrapped in prose and a fence, the way real models often answer.
            let scripts = json!({
                "shortScript": "Some distances are worth crossing for the one you love.",
                "longScript": "Out there, twenty-two light-years away, a new world waits \
                               for someone to notice it. Some stories cross every distance.",
                "performanceNotes": {"short": "Warm, unhurried", "long": "Build to the drop"}
            });
            return Ok(reply(format!(
                "Here you go!\n```json\n{}\n```\nEnjoy the show.",
                scripts
            )));
        };
        Ok(reply(body.to_string()))
    }
}

/// Every call fails at the transport level.
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    fn name(&self) -> &str {
        "failing"
    }

    fn model(&self) -> &str {
        "none"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".to_string(),
        })
    }
}

/// Answers every prompt with an empty reply, like a provider that returned
/// no text blocks.
pub struct SilentLlm;

#[async_trait]
impl LlmProvider for SilentLlm {
    fn name(&self) -> &str {
        "silent"
    }

    fn model(&self) -> &str {
        "silent-model"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        Ok(reply(String::new()))
    }
}
