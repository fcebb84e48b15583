//! Persistence for cached song analyses and session history.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{NewSession, StoredSession};
pub use schema::SCRIPT_STORE_VERSIONED_SCHEMAS;
pub use store::SqliteScriptStore;
pub use trait_def::{SessionStore, SongAnalysisCache};
