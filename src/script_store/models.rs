use crate::analysis::{ContentAnalysis, SongAnalysis};
use crate::content::ContentKind;
use serde::Serialize;

/// One pipeline execution, ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub user_id: String,
    pub content_source: String,
    pub content_type: ContentKind,
    pub content_analysis: ContentAnalysis,
    pub artist: String,
    pub song_title: String,
    pub song_analysis: SongAnalysis,
    pub selected_style: String,
    pub short_script: String,
    pub long_script: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub id: String,
    pub user_id: String,
    pub content_source: String,
    pub content_type: ContentKind,
    pub content_analysis: ContentAnalysis,
    pub artist: String,
    pub song_title: String,
    pub song_analysis: SongAnalysis,
    pub selected_style: String,
    pub short_script: String,
    pub long_script: String,
    /// Unix seconds.
    pub created_at: i64,
}
