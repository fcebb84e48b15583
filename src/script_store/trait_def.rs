use super::models::{NewSession, StoredSession};
use crate::analysis::SongAnalysis;
use anyhow::Result;

/// Song analyses keyed by the exact (artist, title) strings.
pub trait SongAnalysisCache: Send + Sync {
    fn get(&self, artist: &str, title: &str) -> Result<Option<SongAnalysis>>;

    /// Replaces any existing entry for the pair.
    fn put(&self, artist: &str, title: &str, analysis: &SongAnalysis) -> Result<()>;
}

/// History of pipeline executions.
pub trait SessionStore: Send + Sync {
    /// Returns the id of the new record.
    fn insert(&self, session: &NewSession) -> Result<String>;

    /// A session is only visible to the user who created it.
    fn get_session(&self, user_id: &str, session_id: &str) -> Result<Option<StoredSession>>;

    /// Newest first.
    fn get_user_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredSession>>;
}
