//! End-to-end tests for script generation
//!
//! Drives POST /v1/scripts/generate through the real router, SQLite store and
//! page fetcher, with a scripted LLM standing in for the provider.

mod common;

use common::{
    generate_body, FailingLlm, ScriptedLlm, SilentLlm, TestClient, TestServer, ARTICLE_PATH,
    BROKEN_PATH, DJ_USER_ID, FALLBACK_USER_ID, OTHER_DJ_USER_ID, TEST_ARTIST, TEST_SONG_TITLE,
    TEST_STYLE, TOI_715_TEXT,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

// =============================================================================
// Successful Generation
// =============================================================================

#[tokio::test]
async fn test_manual_content_generates_scripts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let short_script = body["shortScript"].as_str().unwrap();
    assert!(short_script.split_whitespace().count() >= 5);
    assert!(!body["longScript"].as_str().unwrap().is_empty());

    let summary = body["contentSummary"].as_str().unwrap();
    assert!(
        summary.contains("TOI-715")
            || summary.contains("exoplanet")
            || summary.contains("22 light-years")
    );
    assert_eq!(body["songAnalysis"]["genre"], "Country pop");
    assert_eq!(body["performanceNotes"]["short"], "Warm, unhurried");
}

#[tokio::test]
async fn test_generation_records_session_for_fallback_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["sessionId"].as_str().expect("session id missing");

    let stored = server
        .sessions
        .get_session(FALLBACK_USER_ID, session_id)
        .unwrap()
        .expect("session not stored");
    assert_eq!(stored.content_source, TOI_715_TEXT);
    assert_eq!(stored.artist, TEST_ARTIST);
    assert_eq!(stored.song_title, TEST_SONG_TITLE);
    assert_eq!(stored.selected_style, TEST_STYLE);
    assert_eq!(stored.short_script, body["shortScript"].as_str().unwrap());
}

#[tokio::test]
async fn test_url_content_is_fetched_from_site() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(&server.site_page(ARTICLE_PATH), "url"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let summary = body["contentSummary"].as_str().unwrap();
    assert!(summary.contains("floating solar farm"));
    assert!(!summary.contains("Sports"));
}

#[tokio::test]
async fn test_search_content_uses_search_block() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body("Robert Redford", "search"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["contentSummary"]
        .as_str()
        .unwrap()
        .starts_with("SEARCH RESULTS FOR: \"Robert Redford\""));
}

#[tokio::test]
async fn test_song_analysis_is_cached_across_requests() {
    let llm = Arc::new(ScriptedLlm::default());
    let server = TestServer::spawn_with_llm(llm.clone()).await;
    let client = TestClient::new(server.base_url.clone());

    let first = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(llm.call_count(), 3);

    let second = client
        .generate_scripts(&generate_body("A second story about the TOI-715 b discovery", "manual"))
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    // Content analysis and synthesis only, the song comes from the cache.
    assert_eq!(llm.call_count(), 5);

    let first: Value = first.json().await.unwrap();
    let second: Value = second.json().await.unwrap();
    assert_eq!(first["songAnalysis"], second["songAnalysis"]);
}

// =============================================================================
// Rejected Requests
// =============================================================================

#[tokio::test]
async fn test_empty_content_source_is_missing_field() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_scripts(&generate_body("", "manual")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields: contentSource");
}

#[tokio::test]
async fn test_all_missing_fields_are_listed() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_scripts(&json!({ "contentType": "manual" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Missing required fields: contentSource, artist, songTitle, selectedStyle"
    );
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body("not-a-url", "url"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Invalid URL format"));
}

#[tokio::test]
async fn test_unreachable_page_is_extraction_error() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(&server.site_page(BROKEN_PATH), "url"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to extract content:"));
}

#[tokio::test]
async fn test_unknown_content_type_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "hologram"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.generate_scripts_raw("{\"artist\": ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_non_compliant_content_lists_issues() {
    let server = TestServer::spawn().await;
    let client = TestClient::as_user(server.base_url.clone(), DJ_USER_ID);

    let response = client
        .generate_scripts(&generate_body("what the hell is this shit", "manual"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["issues"], json!(["shit", "hell"]));

    // Rejected runs leave no session behind.
    let sessions = server.sessions.get_user_sessions(DJ_USER_ID, 10).unwrap();
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_llm_failure_is_opaque_server_error() {
    let server = TestServer::spawn_with_llm(Arc::new(FailingLlm)).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to generate scripts");
    assert!(!body.to_string().contains("x-api-key"));
}

#[tokio::test]
async fn test_empty_llm_replies_return_placeholders() {
    let server = TestServer::spawn_with_llm(Arc::new(SilentLlm)).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["contentSummary"], "Content analysis unavailable");
    assert!(body["shortScript"]
        .as_str()
        .unwrap()
        .starts_with("DEBUGGING: JSON parse failed"));
    assert!(body["longScript"]
        .as_str()
        .unwrap()
        .contains(&format!("Song: {}", TEST_SONG_TITLE)));
}

// =============================================================================
// Session History
// =============================================================================

#[tokio::test]
async fn test_sessions_are_listed_newest_first_per_user() {
    let server = TestServer::spawn().await;
    let dj = TestClient::as_user(server.base_url.clone(), DJ_USER_ID);
    let other = TestClient::as_user(server.base_url.clone(), OTHER_DJ_USER_ID);

    for source in [TOI_715_TEXT, "The harbor bridge reopened after fourteen months of repairs"] {
        let response = dj.generate_scripts(&generate_body(source, "manual")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = dj.get_sessions(None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let sessions: Vec<Value> = response.json().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0]["contentSource"]
        .as_str()
        .unwrap()
        .starts_with("The harbor bridge"));
    assert_eq!(sessions[0]["userId"], DJ_USER_ID);

    let limited: Vec<Value> = dj.get_sessions(Some(1)).await.json().await.unwrap();
    assert_eq!(limited.len(), 1);

    let others: Vec<Value> = other.get_sessions(None).await.json().await.unwrap();
    assert!(others.is_empty());
}

#[tokio::test]
async fn test_session_is_hidden_from_other_users() {
    let server = TestServer::spawn().await;
    let dj = TestClient::as_user(server.base_url.clone(), DJ_USER_ID);
    let other = TestClient::as_user(server.base_url.clone(), OTHER_DJ_USER_ID);

    let body: Value = dj
        .generate_scripts(&generate_body(TOI_715_TEXT, "manual"))
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["sessionId"].as_str().unwrap();

    let response = dj.get_session(session_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["contentType"], "manual");
    assert_eq!(session["longScript"], body["longScript"]);

    assert_eq!(
        other.get_session(session_id).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        dj.get_session("no-such-session").await.status(),
        StatusCode::NOT_FOUND
    );
}
