use serde::{Deserialize, Serialize};

/// Stages of one script generation run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Normalizing,
    SongAnalysis,
    ContentAnalysis,
    ComplianceCheck,
    ScriptSynthesis,
    SessionPersist,
    Responded, // terminal
}

impl PipelineStage {
    pub fn next(&self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Received => Some(Normalizing),
            Normalizing => Some(SongAnalysis),
            SongAnalysis => Some(ContentAnalysis),
            ContentAnalysis => Some(ComplianceCheck),
            ComplianceCheck => Some(ScriptSynthesis),
            ScriptSynthesis => Some(SessionPersist),
            SessionPersist => Some(Responded),
            Responded => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Responded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::SongAnalysis => "song_analysis",
            PipelineStage::ContentAnalysis => "content_analysis",
            PipelineStage::ComplianceCheck => "compliance_check",
            PipelineStage::ScriptSynthesis => "script_synthesis",
            PipelineStage::SessionPersist => "session_persist",
            PipelineStage::Responded => "responded",
        }
    }
}
