//! IntroFuse server library
//!
//! Turns a piece of current content plus a song into radio-host intro
//! scripts. The modules are exposed for the binary and the end-to-end tests.

pub mod analysis;
pub mod compliance;
pub mod config;
pub mod content;
pub mod llm;
pub mod pipeline;
pub mod script_store;
pub mod scripts;
pub mod search;
pub mod server;
pub mod sqlite_persistence;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types for convenience
pub use pipeline::{GenerateScriptsRequest, GenerateScriptsResponse, PipelineError, ScriptPipeline};
pub use script_store::{SessionStore, SongAnalysisCache, SqliteScriptStore};
pub use server::{run_server, RequestsLoggingLevel};
