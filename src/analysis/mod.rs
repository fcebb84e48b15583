//! Song and content analyzers.
//!
//! Both fail open: a reply that cannot be recovered as JSON of the expected
//! shape becomes a placeholder analysis and the pipeline carries on.

mod content_analyzer;
mod models;
mod song_analyzer;

pub use content_analyzer::{content_prompt, ContentAnalyzer};
pub use models::{ContentAnalysis, SongAnalysis};
pub use song_analyzer::{song_prompt, SongAnalyzer};
