use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_RELEVANCE: u8 = 1;
pub const MAX_RELEVANCE: u8 = 10;

/// Emotional and musical profile of a song, cached per (artist, title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongAnalysis {
    pub emotional_tone: String,
    pub themes: Vec<String>,
    pub mood: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    pub key_elements: Vec<String>,
}

impl SongAnalysis {
    /// Placeholder used when the model reply cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            emotional_tone: "Unable to analyze".to_string(),
            themes: vec!["General music".to_string()],
            mood: "Unknown".to_string(),
            meaning: "Song analysis unavailable".to_string(),
            tempo: Some("Unknown".to_string()),
            genre: Some("Unknown".to_string()),
            era: Some("Unknown".to_string()),
            key_elements: vec!["Musical composition".to_string()],
        }
    }
}

/// Facts, tone and topics extracted from one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub tone: String,
    pub topics: Vec<String>,
    #[serde(deserialize_with = "deserialize_relevance")]
    pub relevance_score: u8,
}

impl ContentAnalysis {
    pub fn fallback() -> Self {
        Self {
            summary: "Content analysis unavailable".to_string(),
            key_points: vec!["General content".to_string()],
            tone: "Neutral".to_string(),
            topics: vec!["General topic".to_string()],
            relevance_score: 5,
        }
    }
}

/// Accepts integers, floats and numeric strings, clamped to 1..=10.
fn deserialize_relevance<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|score| score.is_finite())
    .ok_or_else(|| D::Error::custom(format!("invalid relevance_score: {}", value)))?;

    Ok(score
        .round()
        .clamp(MIN_RELEVANCE as f64, MAX_RELEVANCE as f64) as u8)
}
