use super::models::SongAnalysis;
use crate::llm::{complete_prompt, CompletionOptions, LlmError, LlmProvider};
use crate::script_store::SongAnalysisCache;
use crate::scripts::recover_json;
use crate::server::metrics::{record_degraded_result, record_song_cache_lookup};
use std::sync::Arc;
use tracing::{debug, warn};

pub fn song_prompt(artist: &str, title: &str) -> String {
    format!(
        r#"Analyze the song "{title}" by {artist}. Provide a comprehensive analysis including:

1. Emotional tone and mood
2. Key themes and meaning
3. Musical characteristics (tempo, genre, era if known)
4. Key elements that make it distinctive
5. Cultural or historical context if relevant

Format your response as a detailed but concise analysis that would help a radio DJ understand what makes this song special and how it might connect with current topics or audience interests.

CRITICAL: Respond with ONLY valid JSON. No explanations, no markdown formatting, no extra text before or after the JSON.

Required JSON format:
{{
  "emotional_tone": "string describing the overall emotional feeling",
  "themes": ["array", "of", "key", "themes"],
  "mood": "string describing the mood",
  "meaning": "string describing the song's meaning or message",
  "tempo": "string describing tempo (fast/medium/slow/etc)",
  "genre": "string describing the genre",
  "era": "string describing the time period or era",
  "key_elements": ["array", "of", "distinctive", "elements"]
}}"#
    )
}

/// Song analysis with a read-through cache keyed by the exact
/// (artist, title) pair.
///
/// Concurrent misses for the same song may both call the model and both
/// write; the store keeps the last write.
pub struct SongAnalyzer {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    cache: Arc<dyn SongAnalysisCache>,
}

impl SongAnalyzer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        options: CompletionOptions,
        cache: Arc<dyn SongAnalysisCache>,
    ) -> Self {
        Self {
            llm,
            options,
            cache,
        }
    }

    /// Returns the cached analysis or computes and stores a new one.
    ///
    /// Only transport failures are errors. An unparseable reply yields
    /// [`SongAnalysis::fallback`], which is not cached.
    pub async fn analyze(&self, artist: &str, title: &str) -> Result<SongAnalysis, LlmError> {
        match self.cache.get(artist, title) {
            Ok(Some(cached)) => {
                record_song_cache_lookup("hit");
                debug!(artist, title, "Song analysis cache hit");
                return Ok(cached);
            }
            Ok(None) => record_song_cache_lookup("miss"),
            Err(e) => {
                record_song_cache_lookup("error");
                warn!(artist, title, error = %e, "Song analysis cache read failed");
            }
        }

        let response =
            complete_prompt(self.llm.as_ref(), &song_prompt(artist, title), &self.options).await?;

        match recover_json::<SongAnalysis>(&response.content) {
            Ok(analysis) => {
                if let Err(e) = self.cache.put(artist, title, &analysis) {
                    warn!(artist, title, error = %e, "Failed to cache song analysis");
                }
                Ok(analysis)
            }
            Err(e) => {
                record_degraded_result("song_analysis");
                warn!(artist, title, error = %e, "Song analysis unparseable, using fallback");
                Ok(SongAnalysis::fallback())
            }
        }
    }
}
