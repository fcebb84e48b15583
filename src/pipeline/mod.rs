//! Script generation pipeline.
//!
//! Normalize, analyze the song (cached), analyze the content, gate on
//! compliance, synthesize, then record the session on a best-effort basis.

mod error;
mod orchestrator;
mod state;

pub use error::PipelineError;
pub use orchestrator::{GenerateScriptsRequest, GenerateScriptsResponse, PipelineDeps, ScriptPipeline};
pub use state::PipelineStage;
