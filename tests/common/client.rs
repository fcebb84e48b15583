//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client, optionally acting for a named user
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a client that sends no user header, so it acts for the
    /// fallback identity
    pub fn new(base_url: String) -> Self {
        Self::build(base_url, HeaderMap::new())
    }

    /// Creates a client that identifies as `user_id` on every request
    pub fn as_user(base_url: String, user_id: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-User-Id",
            HeaderValue::from_str(user_id).expect("Invalid user id header"),
        );
        Self::build(base_url, headers)
    }

    fn build(base_url: String, headers: HeaderMap) -> Self {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Scripts Endpoints
    // ========================================================================

    /// POST /v1/scripts/generate
    pub async fn generate_scripts(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/scripts/generate", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// POST /v1/scripts/generate with a raw, possibly malformed, body
    pub async fn generate_scripts_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/v1/scripts/generate", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Generate request failed")
    }

    /// GET /v1/scripts/styles
    pub async fn get_styles(&self) -> Response {
        self.client
            .get(format!("{}/v1/scripts/styles", self.base_url))
            .send()
            .await
            .expect("Styles request failed")
    }

    // ========================================================================
    // Content Endpoints
    // ========================================================================

    /// POST /v1/content/extract-url
    pub async fn extract_url(&self, url: &str) -> Response {
        self.client
            .post(format!("{}/v1/content/extract-url", self.base_url))
            .json(&json!({ "url": url }))
            .send()
            .await
            .expect("Extract request failed")
    }

    /// POST /v1/content/search
    pub async fn search(&self, query: &str) -> Response {
        self.client
            .post(format!("{}/v1/content/search", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .expect("Search request failed")
    }

    // ========================================================================
    // Session Endpoints
    // ========================================================================

    /// GET /v1/sessions
    pub async fn get_sessions(&self, limit: Option<usize>) -> Response {
        let url = match limit {
            Some(limit) => format!("{}/v1/sessions?limit={}", self.base_url, limit),
            None => format!("{}/v1/sessions", self.base_url),
        };
        self.client
            .get(url)
            .send()
            .await
            .expect("Sessions request failed")
    }

    /// GET /v1/sessions/{id}
    pub async fn get_session(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/sessions/{}", self.base_url, id))
            .send()
            .await
            .expect("Session request failed")
    }
}
