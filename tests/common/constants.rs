//! Shared constants for end-to-end tests
//!
//! When request fixtures or fixture site pages change, update only this file.

#![allow(dead_code)]

// ============================================================================
// Users
// ============================================================================

/// A DJ identified through the X-User-Id header
pub const DJ_USER_ID: &str = "dj-morning-show";

/// A second DJ, used to check session ownership
pub const OTHER_DJ_USER_ID: &str = "dj-late-night";

/// Identity the server falls back to when no header is sent
pub const FALLBACK_USER_ID: &str = "97b40a42-c939-402f-bf70-e40989142552";

// ============================================================================
// Generate Request Fields
// ============================================================================

pub const TOI_715_TEXT: &str =
    "Scientists found an Earth-like exoplanet 22 light-years away called TOI-715 b";

pub const TEST_ARTIST: &str = "Taylor Swift";

pub const TEST_SONG_TITLE: &str = "Love Story";

pub const TEST_STYLE: &str = "Casual";

// ============================================================================
// Fixture Site Pages
// ============================================================================

/// A news article with navigation and footer chrome
pub const ARTICLE_PATH: &str = "/news/solar-farm";

/// A fragment that mentions TOI-715 b inside a <main> block
pub const MAIN_PATH: &str = "/space/toi-715";

/// A page whose text is too short to use
pub const SHORT_PATH: &str = "/short";

/// A "page not found" page served with status 200
pub const SOFT_404_PATH: &str = "/soft-404";

/// Always answers 500
pub const BROKEN_PATH: &str = "/broken";

/// Answers 503 on the first hit, then serves the solar farm article
pub const FLAKY_PATH: &str = "/flaky";

/// Always answers 404
pub const MISSING_PATH: &str = "/missing";

/// Backoff used by servers spawned with fetch retries enabled
pub const TEST_RETRY_BACKOFF_MS: u64 = 10;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for a server
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 25;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
