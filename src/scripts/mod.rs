//! Script synthesis: style catalogue, prompt assembly and JSON recovery.

mod recovery;
mod styles;
mod synthesizer;

pub use recovery::{recover_json, ParseError};
pub use styles::StyleDirectives;
pub use synthesizer::{script_prompt, PerformanceNotes, ScriptResult, ScriptSynthesizer};
