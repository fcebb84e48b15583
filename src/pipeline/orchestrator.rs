use super::error::PipelineError;
use super::state::PipelineStage;
use crate::analysis::{ContentAnalyzer, SongAnalysis, SongAnalyzer};
use crate::compliance::ComplianceFilter;
use crate::content::{ContentKind, ContentNormalizer, ContentSource};
use crate::llm::{CompletionOptions, LlmProvider};
use crate::script_store::{NewSession, SessionStore, SongAnalysisCache};
use crate::scripts::{PerformanceNotes, ScriptSynthesizer, StyleDirectives};
use crate::server::metrics::record_pipeline_run;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Body of the generate-scripts request. Every field is optional at the
/// wire level so that missing ones can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScriptsRequest {
    pub content_source: Option<String>,
    pub content_type: Option<String>,
    pub artist: Option<String>,
    pub song_title: Option<String>,
    pub selected_style: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScriptsResponse {
    pub short_script: String,
    pub long_script: String,
    pub performance_notes: PerformanceNotes,
    pub content_summary: String,
    pub song_analysis: SongAnalysis,
    /// `None` when the session could not be recorded.
    pub session_id: Option<String>,
}

/// A request that passed validation.
#[derive(Debug)]
struct ValidatedRequest {
    source: ContentSource,
    artist: String,
    song_title: String,
    style: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl GenerateScriptsRequest {
    fn validate(&self) -> Result<ValidatedRequest, PipelineError> {
        let fields = [
            ("contentSource", present(&self.content_source)),
            ("artist", present(&self.artist)),
            ("songTitle", present(&self.song_title)),
            ("selectedStyle", present(&self.selected_style)),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let kind = ContentKind::parse(self.content_type.as_deref())?;
        let [content_source, artist, song_title, style] = fields.map(|(_, v)| v.unwrap_or(""));
        Ok(ValidatedRequest {
            source: ContentSource::new(content_source, kind),
            artist: artist.to_string(),
            song_title: song_title.to_string(),
            style: style.to_string(),
        })
    }
}

/// Services the pipeline is assembled from.
pub struct PipelineDeps {
    pub llm: Arc<dyn LlmProvider>,
    pub options: CompletionOptions,
    pub normalizer: ContentNormalizer,
    pub song_cache: Arc<dyn SongAnalysisCache>,
    pub sessions: Arc<dyn SessionStore>,
    pub styles: StyleDirectives,
}

pub struct ScriptPipeline {
    normalizer: ContentNormalizer,
    song_analyzer: SongAnalyzer,
    content_analyzer: ContentAnalyzer,
    compliance: ComplianceFilter,
    synthesizer: ScriptSynthesizer,
    sessions: Arc<dyn SessionStore>,
}

struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn advance(&mut self) -> PipelineStage {
        if let Some(next) = self.stage.next() {
            debug!(from = self.stage.as_str(), to = next.as_str(), "Pipeline transition");
            self.stage = next;
        }
        self.stage
    }
}

impl ScriptPipeline {
    pub fn new(deps: PipelineDeps) -> Self {
        Self {
            normalizer: deps.normalizer,
            song_analyzer: SongAnalyzer::new(
                deps.llm.clone(),
                deps.options.clone(),
                deps.song_cache,
            ),
            content_analyzer: ContentAnalyzer::new(deps.llm.clone(), deps.options.clone()),
            compliance: ComplianceFilter::new(),
            synthesizer: ScriptSynthesizer::new(deps.llm, deps.options, deps.styles),
            sessions: deps.sessions,
        }
    }

    pub fn normalizer(&self) -> &ContentNormalizer {
        &self.normalizer
    }

    pub fn styles(&self) -> &StyleDirectives {
        self.synthesizer.styles()
    }

    pub async fn run(
        &self,
        user_id: &str,
        request: &GenerateScriptsRequest,
    ) -> Result<GenerateScriptsResponse, PipelineError> {
        let start = Instant::now();
        let mut tracker = StageTracker {
            stage: PipelineStage::Received,
        };

        let result = self.execute(user_id, request, &mut tracker).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(response) => {
                record_pipeline_run("success");
                info!(
                    user_id,
                    elapsed_ms,
                    session_recorded = response.session_id.is_some(),
                    "Scripts generated"
                );
            }
            Err(e) => {
                record_pipeline_run(e.kind());
                warn!(
                    user_id,
                    stage = tracker.stage.as_str(),
                    error = %e,
                    elapsed_ms,
                    "Script generation failed"
                );
            }
        }
        result
    }

    async fn execute(
        &self,
        user_id: &str,
        request: &GenerateScriptsRequest,
        tracker: &mut StageTracker,
    ) -> Result<GenerateScriptsResponse, PipelineError> {
        let request = request.validate()?;

        tracker.advance();
        let text = self.normalizer.normalize(&request.source).await?;

        tracker.advance();
        let song_analysis = self
            .song_analyzer
            .analyze(&request.artist, &request.song_title)
            .await?;

        tracker.advance();
        let content_analysis = self
            .content_analyzer
            .analyze(&text, request.source.kind)
            .await?;

        tracker.advance();
        let compliance = self.compliance.check(&text);
        if !compliance.is_compliant {
            return Err(PipelineError::ComplianceRejected {
                issues: compliance.issues,
            });
        }

        tracker.advance();
        let scripts = self
            .synthesizer
            .generate(
                &content_analysis,
                &song_analysis,
                &request.artist,
                &request.song_title,
                &request.style,
            )
            .await?;

        tracker.advance();
        let session = NewSession {
            user_id: user_id.to_string(),
            content_source: request.source.value.clone(),
            content_type: request.source.kind,
            content_analysis: content_analysis.clone(),
            artist: request.artist.clone(),
            song_title: request.song_title.clone(),
            song_analysis: song_analysis.clone(),
            selected_style: request.style.clone(),
            short_script: scripts.short_script.clone(),
            long_script: scripts.long_script.clone(),
        };
        let session_id = match self.sessions.insert(&session) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to record content session");
                None
            }
        };

        tracker.advance();
        Ok(GenerateScriptsResponse {
            short_script: scripts.short_script,
            long_script: scripts.long_script,
            performance_notes: scripts.performance_notes,
            content_summary: content_analysis.summary,
            song_analysis,
            session_id,
        })
    }
}
