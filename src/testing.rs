//! Hand-written stand-ins for the external collaborators, shared by unit tests.

use crate::analysis::SongAnalysis;
use crate::content::{ContentError, PageFetcher};
use crate::llm::{
    CompletionOptions, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
};
use crate::script_store::{NewSession, SessionStore, SongAnalysisCache, StoredSession};
use crate::search::{SearchProvider, SearchResult};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn reply(content: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        content: content.into(),
        finish_reason: FinishReason::Stop,
        usage: None,
    }
}

fn last_prompt(messages: &[Message]) -> &str {
    messages.last().map(|m| m.content.as_str()).unwrap_or("")
}

/// Answers every prompt with the same text.
pub struct StubLlm {
    reply: String,
    calls: AtomicUsize,
}

impl StubLlm {
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(reply(self.reply.clone()))
    }
}

/// Picks a well-formed reply by looking at which prompt it received.
/// The content analysis summary echoes the analyzed text.
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
        let prompt = last_prompt(messages);

        let body = if prompt.starts_with("Analyze the song") {
            serde_json::json!({
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
            serde_json::json!({
                "summary": text,
                "key_points": [text],
                "tone": "Curious",
                "topics": ["News"],
                "relevance_score": 7
            })
        } else {
            serde_json::json!({
                "shortScript": "Some distances are worth crossing for love.",
                "longScript": "Out there, twenty-two light-years away, a new world waits. \
                               Some stories cross every distance.",
                "performanceNotes": {"short": "Warm", "long": "Slow build"}
            })
        };
        Ok(reply(body.to_string()))
    }
}

/// Fails every call as if the network were down.
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
        Err(LlmError::Connection("connection refused".to_string()))
    }
}

/// Serves canned pages; unknown URLs answer 404.
#[derive(Default)]
pub struct StubPageFetcher {
    pages: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
}

impl StubPageFetcher {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl PageFetcher for StubPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or(ContentError::HttpStatus(404))
    }
}

pub struct EmptySearchProvider;

#[async_trait]
impl SearchProvider for EmptySearchProvider {
    fn name(&self) -> &str {
        "empty"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct InMemorySongCache {
    entries: Mutex<HashMap<(String, String), SongAnalysis>>,
    broken: bool,
}

impl InMemorySongCache {
    /// Every read and write fails.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl SongAnalysisCache for InMemorySongCache {
    fn get(&self, artist: &str, title: &str) -> Result<Option<SongAnalysis>> {
        if self.broken {
            bail!("song cache unavailable");
        }
        let key = (artist.to_string(), title.to_string());
        Ok(self.entries.lock().unwrap().get(&key).cloned())
    }

    fn put(&self, artist: &str, title: &str, analysis: &SongAnalysis) -> Result<()> {
        if self.broken {
            bail!("song cache unavailable");
        }
        self.entries
            .lock()
            .unwrap()
            .insert((artist.to_string(), title.to_string()), analysis.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<Vec<StoredSession>>,
}

impl InMemorySessionStore {
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: &NewSession) -> Result<String> {
        let mut sessions = self.sessions.lock().unwrap();
        let id = format!("session-{}", sessions.len() + 1);
        let created_at = sessions.len() as i64;
        sessions.push(StoredSession {
            id: id.clone(),
            user_id: session.user_id.clone(),
            content_source: session.content_source.clone(),
            content_type: session.content_type,
            content_analysis: session.content_analysis.clone(),
            artist: session.artist.clone(),
            song_title: session.song_title.clone(),
            song_analysis: session.song_analysis.clone(),
            selected_style: session.selected_style.clone(),
            short_script: session.short_script.clone(),
            long_script: session.long_script.clone(),
            created_at,
        });
        Ok(id)
    }

    fn get_session(&self, user_id: &str, session_id: &str) -> Result<Option<StoredSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id && s.user_id == user_id)
            .cloned())
    }

    fn get_user_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Rejects every write.
pub struct FailingSessionStore;

impl SessionStore for FailingSessionStore {
    fn insert(&self, _session: &NewSession) -> Result<String> {
        bail!("disk full")
    }

    fn get_session(&self, _user_id: &str, _session_id: &str) -> Result<Option<StoredSession>> {
        Ok(None)
    }

    fn get_user_sessions(&self, _user_id: &str, _limit: usize) -> Result<Vec<StoredSession>> {
        Ok(Vec::new())
    }
}
