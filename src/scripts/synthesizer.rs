use super::recovery::{recover_json, ParseError};
use super::styles::StyleDirectives;
use crate::analysis::{ContentAnalysis, SongAnalysis};
use crate::llm::{complete_prompt, CompletionOptions, LlmError, LlmProvider};
use crate::server::metrics::record_degraded_result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const RESPONSE_PREVIEW_CHARS: usize = 200;

const BANNED_TRANSITIONS: &[&str] = &[
    "Speaking of [content topic]...",
    "And speaking of...",
    "Here's a song about...",
    "Which brings us to...",
    "That reminds me of...",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceNotes {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptResult {
    pub short_script: String,
    pub long_script: String,
    pub performance_notes: PerformanceNotes,
}

impl ScriptResult {
    /// Labeled placeholder carrying enough detail to diagnose a bad reply.
    pub fn debug_fallback(
        error: &ParseError,
        response: &str,
        content: &ContentAnalysis,
        song_title: &str,
    ) -> Self {
        let preview: String = response.chars().take(RESPONSE_PREVIEW_CHARS).collect();
        Self {
            short_script: format!(
                "DEBUGGING: JSON parse failed. Error: {}. Response length: {}",
                error,
                response.len()
            ),
            long_script: format!(
                "DEBUGGING: The model returned invalid JSON. This may be due to response \
                 truncation, rate limiting, or prompt issues. Content: {} | Song: {} | \
                 Response preview: {}",
                content.summary, song_title, preview
            ),
            performance_notes: PerformanceNotes {
                short: "Debug: Check server logs for detailed error info".to_string(),
                long: "Debug: JSON parsing failed - see server logs for full details".to_string(),
            },
        }
    }
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

pub fn script_prompt(
    content: &ContentAnalysis,
    song: &SongAnalysis,
    artist: &str,
    title: &str,
    style_directive: &str,
) -> String {
    let banned = BANNED_TRANSITIONS
        .iter()
        .map(|phrase| format!("- \"{}\"", phrase))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a master radio DJ known for creating brilliant, unexpected connections between current events and music. Your specialty is finding the artful thread that ties seemingly unrelated content to songs in clever, entertaining ways that surprise and delight listeners.

CURRENT CONTENT TO CONNECT:
Summary: {summary}
Key Points: {key_points}
Main Topics: {topics}
Content Tone: {tone}

SONG TO INTRODUCE:
"{title}" by {artist}
Emotional Core: {emotional_tone}
Key Themes: {themes}
Song Mood: {mood}
Song Meaning: {meaning}
Musical Style: {genre} from {era}

WRITING STYLE: {style_directive}

YOUR MISSION: Create scripts that blend content and song into one unified story. This is NOT about introducing a song or transitioning between topics. The content and the song are two expressions of the same underlying idea, and the listener should feel they were always part of the same story.

CRITICAL REQUIREMENTS:
1. MUST include SPECIFIC DETAILS from the content: names, places, numbers, exact facts that make the story identifiable
2. Listeners should immediately know which story you're referencing without having to guess
3. Find the unexpected connection and avoid obvious relationships
4. SHORT SCRIPT (5-10 seconds, ~25-50 words): A sharp, clever connection with specific details
5. LONG SCRIPT (15-20 seconds, ~75-100 words): Build the connection with more detail and sophistication
6. Use broadcast-appropriate language throughout

AVOID basic transitions like:
{banned}

Instead, frame the content and the song as one thought, for example:
- Content about space exploration + love song: "Just like those astronomers reaching across 22 light-years to find Earth's twin, some connections transcend impossible distances..."
- News about economic changes + folk song: "As Wall Street numbers shift, the truths in these lyrics hold steady..."

CRITICAL: Respond with ONLY valid JSON. No explanations, no markdown formatting, no extra text before or after the JSON.

Required JSON format:
{{
  "shortScript": "5-10 second script with artful connection",
  "longScript": "15-20 second script with sophisticated connection",
  "performanceNotes": {{
    "short": "performance guidance emphasizing the connection",
    "long": "performance guidance for building the revelation"
  }}
}}"#,
        summary = non_empty_or(&content.summary, "No content analysis available"),
        key_points = join_or(&content.key_points, "No key points"),
        topics = join_or(&content.topics, "No topics"),
        tone = non_empty_or(&content.tone, "Neutral"),
        emotional_tone = song.emotional_tone,
        themes = join_or(&song.themes, "Universal human themes"),
        mood = song.mood,
        meaning = song.meaning,
        genre = song.genre.as_deref().filter(|g| !g.is_empty()).unwrap_or("Timeless"),
        era = song.era.as_deref().filter(|e| !e.is_empty()).unwrap_or("the past"),
    )
}

pub struct ScriptSynthesizer {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
    styles: StyleDirectives,
}

impl ScriptSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>, options: CompletionOptions, styles: StyleDirectives) -> Self {
        Self {
            llm,
            options,
            styles,
        }
    }

    pub fn styles(&self) -> &StyleDirectives {
        &self.styles
    }

    /// Generates both scripts. Only a failed model call is an error; an
    /// unrecoverable reply becomes [`ScriptResult::debug_fallback`].
    pub async fn generate(
        &self,
        content: &ContentAnalysis,
        song: &SongAnalysis,
        artist: &str,
        title: &str,
        style: &str,
    ) -> Result<ScriptResult, LlmError> {
        let directive = self.styles.directive_for(style);
        let prompt = script_prompt(content, song, artist, title, directive);
        let response = complete_prompt(self.llm.as_ref(), &prompt, &self.options).await?;

        match recover_json::<ScriptResult>(&response.content) {
            Ok(scripts) => {
                debug!(
                    style,
                    short_words = scripts.short_script.split_whitespace().count(),
                    long_words = scripts.long_script.split_whitespace().count(),
                    "Scripts generated"
                );
                Ok(scripts)
            }
            Err(e) => {
                record_degraded_result("synthesis");
                warn!(
                    error = %e,
                    response_len = response.content.len(),
                    artist,
                    title,
                    "Script reply unrecoverable, returning debug placeholder"
                );
                Ok(ScriptResult::debug_fallback(&e, &response.content, content, title))
            }
        }
    }
}
