//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own SQLite database, plus a
//! fixture news site the server can extract pages from.

use super::constants::*;
use super::fixtures::{fixture_site_router, ScriptedLlm, SiteHits};
use introfuse_server::config::ExtractionSettings;
use introfuse_server::content::{ContentNormalizer, ReqwestPageFetcher};
use introfuse_server::llm::{CompletionOptions, LlmProvider};
use introfuse_server::pipeline::{PipelineDeps, ScriptPipeline};
use introfuse_server::script_store::{SessionStore, SqliteScriptStore};
use introfuse_server::scripts::StyleDirectives;
use introfuse_server::search::StaticSearchProvider;
use introfuse_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test server instance with an isolated database
///
/// When dropped, both servers shut down and the temp directory is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Base URL of the fixture news site
    pub site_url: String,

    /// Session store for direct database access in tests
    pub sessions: Arc<dyn SessionStore>,

    /// How often the counted fixture pages were requested
    pub site_hits: SiteHits,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_txs: Vec<oneshot::Sender<()>>,
}

async fn bind_random_port() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    (listener, format!("http://127.0.0.1:{}", port))
}

fn serve_until_shutdown(listener: TcpListener, app: axum::Router) -> oneshot::Sender<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
    });
    shutdown_tx
}

impl TestServer {
    /// Spawns a server backed by the scripted LLM
    pub async fn spawn() -> Self {
        Self::spawn_with_llm(Arc::new(ScriptedLlm::default())).await
    }

    /// Spawns a server with the given LLM provider and single-shot fetches
    pub async fn spawn_with_llm(llm: Arc<dyn LlmProvider>) -> Self {
        let extraction = ExtractionSettings {
            timeout_secs: 5,
            ..Default::default()
        };
        Self::spawn_with(llm, extraction).await
    }

    /// Spawns a server whose page fetches retry up to `max_retries` times
    pub async fn spawn_with_fetch_retries(max_retries: u32) -> Self {
        let extraction = ExtractionSettings {
            timeout_secs: 5,
            max_retries,
            initial_backoff_ms: TEST_RETRY_BACKOFF_MS,
            max_backoff_ms: TEST_RETRY_BACKOFF_MS,
            ..Default::default()
        };
        Self::spawn_with(Arc::new(ScriptedLlm::default()), extraction).await
    }

    /// Spawns a server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, a port cannot be bound, or
    /// the server does not become ready within the timeout.
    pub async fn spawn_with(llm: Arc<dyn LlmProvider>, extraction: ExtractionSettings) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteScriptStore::new(temp_db_dir.path().join("introfuse.db"))
                .expect("Failed to open script store"),
        );

        let (site_listener, site_url) = bind_random_port().await;
        let site_hits = SiteHits::default();
        let site_shutdown =
            serve_until_shutdown(site_listener, fixture_site_router(site_hits.clone()));

        let fetcher =
            Arc::new(ReqwestPageFetcher::new(&extraction).expect("Failed to build page fetcher"));
        let search = Arc::new(StaticSearchProvider);

        let pipeline = ScriptPipeline::new(PipelineDeps {
            llm,
            options: CompletionOptions::default(),
            normalizer: ContentNormalizer::new(fetcher, search.clone()),
            song_cache: store.clone(),
            sessions: store.clone(),
            styles: StyleDirectives::default(),
        });

        let (listener, base_url) = bind_random_port().await;
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: listener.local_addr().map(|a| a.port()).unwrap_or_default(),
            metrics_port: 0,
            frontend_dir_path: None,
            default_user_id: FALLBACK_USER_ID.to_string(),
        };
        let app = make_app(config, Arc::new(pipeline), store.clone(), search)
            .expect("Failed to build app");
        let app_shutdown = serve_until_shutdown(listener, app);

        let server = Self {
            base_url,
            site_url,
            sessions: store,
            site_hits,
            _temp_db_dir: temp_db_dir,
            _shutdown_txs: vec![app_shutdown, site_shutdown],
        };

        server.wait_for_ready().await;

        server
    }

    /// Full URL of a fixture site page
    pub fn site_page(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for tx in self._shutdown_txs.drain(..) {
            let _ = tx.send(());
        }
    }
}
