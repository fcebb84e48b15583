use crate::content::ContentError;
use crate::llm::LlmError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

const TRANSPORT_ERROR_MESSAGE: &str = "Failed to generate scripts";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Content does not meet broadcast standards")]
    ComplianceRejected { issues: Vec<String> },

    /// The detail is logged, never returned to the caller.
    #[error("Upstream failure: {0}")]
    Transport(String),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Validation(_)
            | PipelineError::Extraction(_)
            | PipelineError::ComplianceRejected { .. } => StatusCode::BAD_REQUEST,
            PipelineError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::ComplianceRejected { .. } => "compliance_rejected",
            PipelineError::Transport(_) => "transport",
        }
    }
}

impl From<ContentError> for PipelineError {
    fn from(err: ContentError) -> Self {
        if err.is_validation() {
            PipelineError::Validation(err.to_string())
        } else {
            PipelineError::Extraction(format!("Failed to extract content: {}", err))
        }
    }
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        PipelineError::Transport(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<String>>,
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            PipelineError::Transport(detail) => {
                error!("Pipeline transport failure: {}", detail);
                ErrorBody {
                    error: TRANSPORT_ERROR_MESSAGE.to_string(),
                    issues: None,
                }
            }
            PipelineError::ComplianceRejected { issues } => ErrorBody {
                error: "Content does not meet broadcast standards".to_string(),
                issues: Some(issues),
            },
            other => ErrorBody {
                error: other.to_string(),
                issues: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
