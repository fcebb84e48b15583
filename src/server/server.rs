use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::pipeline::{GenerateScriptsRequest, PipelineError};
use crate::script_store::StoredSession;
use crate::search::SearchResult;
use tower_http::services::ServeDir;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::metrics::metrics_handler;
use super::state::*;
use super::{log_requests, CurrentUser, ServerConfig};

pub const DEFAULT_SESSIONS_LIMIT: usize = 20;
pub const MAX_SESSIONS_LIMIT: usize = 100;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct ExtractUrlBody {
    pub url: Option<String>,
}

#[derive(Serialize)]
struct ExtractUrlResponse {
    content: String,
    success: bool,
}

#[derive(Deserialize, Debug)]
struct SearchBody {
    pub query: Option<String>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Serialize)]
struct StylesResponse {
    styles: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct SessionsQuery {
    pub limit: Option<usize>,
}

/// Body-level rejections count as bad input.
fn invalid_body(rejection: JsonRejection) -> PipelineError {
    PipelineError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

fn required(value: Option<String>, field: &str) -> Result<String, PipelineError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PipelineError::Validation(format!("Missing required fields: {}", field)))
}

fn sessions_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_SESSIONS_LIMIT)
        .clamp(1, MAX_SESSIONS_LIMIT)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

async fn generate_scripts(
    user: CurrentUser,
    State(pipeline): State<GuardedPipeline>,
    payload: Result<Json<GenerateScriptsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };

    match pipeline.run(user.id(), &request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_styles(State(pipeline): State<GuardedPipeline>) -> impl IntoResponse {
    let styles = pipeline
        .styles()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(StylesResponse { styles })
}

async fn extract_url(
    State(pipeline): State<GuardedPipeline>,
    payload: Result<Json<ExtractUrlBody>, JsonRejection>,
) -> Response {
    let url = match payload
        .map_err(invalid_body)
        .and_then(|Json(body)| required(body.url, "url"))
    {
        Ok(url) => url,
        Err(err) => return err.into_response(),
    };

    match pipeline.normalizer().extract_url(&url).await {
        Ok(content) => Json(ExtractUrlResponse {
            content,
            success: true,
        })
        .into_response(),
        Err(err) => PipelineError::from(err).into_response(),
    }
}

async fn search_content(
    State(search): State<GuardedSearchProvider>,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> Response {
    let query = match payload
        .map_err(invalid_body)
        .and_then(|Json(body)| required(body.query, "query"))
    {
        Ok(query) => query,
        Err(err) => return err.into_response(),
    };

    match search.search(&query).await {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(err) => {
            warn!(provider = search.name(), error = %err, "Search preview failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "Search is currently unavailable" })),
            )
                .into_response()
        }
    }
}

async fn get_user_sessions(
    user: CurrentUser,
    State(sessions): State<GuardedSessionStore>,
    Query(query): Query<SessionsQuery>,
) -> Response {
    let limit = sessions_limit(query.limit);
    match sessions.get_user_sessions(user.id(), limit) {
        Ok(list) => Json::<Vec<StoredSession>>(list).into_response(),
        Err(err) => {
            error!("Error listing sessions for user {}: {}", user.id(), err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_session(
    user: CurrentUser,
    State(sessions): State<GuardedSessionStore>,
    Path(id): Path<String>,
) -> Response {
    match sessions.get_session(user.id(), &id) {
        Ok(Some(session)) => Json(session).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Error reading session {}: {}", id, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    pipeline: GuardedPipeline,
    sessions: GuardedSessionStore,
    search: GuardedSearchProvider,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), pipeline, sessions, search);

    let script_routes: Router = Router::new()
        .route("/generate", post(generate_scripts))
        .route("/styles", get(get_styles))
        .with_state(state.clone());

    let content_routes: Router = Router::new()
        .route("/extract-url", post(extract_url))
        .route("/search", post(search_content))
        .with_state(state.clone());

    let session_routes: Router = Router::new()
        .route("/", get(get_user_sessions))
        .route("/{id}", get(get_session))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/scripts", script_routes)
        .nest("/v1/content", content_routes)
        .nest("/v1/sessions", session_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    pipeline: GuardedPipeline,
    sessions: GuardedSessionStore,
    search: GuardedSearchProvider,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, pipeline, sessions, search)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Listening on {} (metrics on {})", port, metrics_port);

    tokio::try_join!(
        async { axum::serve(listener, app).await },
        async { axum::serve(metrics_listener, make_metrics_app()).await },
    )?;
    Ok(())
}
