use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all IntroFuse metrics
const PREFIX: &str = "introfuse";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Pipeline Metrics
    pub static ref PIPELINE_RUNS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_pipeline_runs_total"), "Script generation runs by outcome"),
        &["outcome"]
    ).expect("Failed to create pipeline_runs_total metric");

    pub static ref DEGRADED_RESULTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_degraded_results_total"),
            "Placeholder results substituted for unparseable model replies"
        ),
        &["stage"]
    ).expect("Failed to create degraded_results_total metric");

    pub static ref CONTENT_EXTRACTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_content_extractions_total"), "Content normalizations"),
        &["kind", "outcome"]
    ).expect("Failed to create content_extractions_total metric");

    pub static ref SONG_CACHE_LOOKUPS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_song_cache_lookups_total"), "Song analysis cache lookups"),
        &["result"]
    ).expect("Failed to create song_cache_lookups_total metric");

    // LLM Metrics
    pub static ref LLM_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_llm_requests_total"), "Total LLM completion requests"),
        &["provider", "status"]
    ).expect("Failed to create llm_requests_total metric");

    pub static ref LLM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_llm_request_duration_seconds"),
            "LLM completion duration in seconds"
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["provider"]
    ).expect("Failed to create llm_request_duration_seconds metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(PIPELINE_RUNS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DEGRADED_RESULTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CONTENT_EXTRACTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(SONG_CACHE_LOOKUPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(LLM_REQUEST_DURATION_SECONDS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_pipeline_run(outcome: &str) {
    PIPELINE_RUNS_TOTAL.with_label_values(&[outcome]).inc();
}

/// `stage` is one of song_analysis, content_analysis, synthesis.
pub fn record_degraded_result(stage: &str) {
    DEGRADED_RESULTS_TOTAL.with_label_values(&[stage]).inc();
}

pub fn record_content_extraction(kind: &str, outcome: &str) {
    CONTENT_EXTRACTIONS_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
}

pub fn record_song_cache_lookup(result: &str) {
    SONG_CACHE_LOOKUPS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_llm_request(provider: &str, status: &str, duration: Duration) {
    LLM_REQUESTS_TOTAL
        .with_label_values(&[provider, status])
        .inc();

    LLM_REQUEST_DURATION_SECONDS
        .with_label_values(&[provider])
        .observe(duration.as_secs_f64());
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
