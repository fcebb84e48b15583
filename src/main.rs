use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Import modules from the library crate
use introfuse_server::config::{self, AppConfig, FileConfig};
use introfuse_server::content::{ContentNormalizer, ReqwestPageFetcher};
use introfuse_server::llm;
use introfuse_server::pipeline::{PipelineDeps, ScriptPipeline};
use introfuse_server::script_store::SqliteScriptStore;
use introfuse_server::scripts::StyleDirectives;
use introfuse_server::search;
use introfuse_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the database file (introfuse.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3010)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9093)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Identity used for requests that carry no X-User-Id header.
    #[clap(long)]
    pub default_user_id: Option<String>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            default_user_id: args.default_user_id.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&config::CliConfig::from(&cli_args), file_config)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let db_path = app_config.store_db_path();
    info!("Opening SQLite database at {:?}...", db_path);
    let store = Arc::new(SqliteScriptStore::new(&db_path)?);

    info!(
        provider = ?app_config.llm.provider,
        model = %app_config.llm.model,
        "Configuring LLM provider"
    );
    if app_config.llm.api_key.is_none() && app_config.llm.api_key_command.is_none() {
        warn!("No LLM API key configured, completions will be rejected upstream");
    }
    let llm = llm::provider_from_settings(&app_config.llm);

    let search = search::provider_from_settings(&app_config.search)?;
    info!("Search fallback uses the {} provider", search.name());

    let fetcher = Arc::new(ReqwestPageFetcher::new(&app_config.extraction)?);
    let pipeline = ScriptPipeline::new(PipelineDeps {
        llm,
        options: llm::options_from_settings(&app_config.llm),
        normalizer: ContentNormalizer::new(fetcher, search.clone()),
        song_cache: store.clone(),
        sessions: store.clone(),
        styles: StyleDirectives::from_settings(&app_config.styles),
    });

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
        default_user_id: app_config.default_user_id.clone(),
    };

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);

    tokio::select! {
        result = run_server(server_config, Arc::new(pipeline), store, search) => {
            info!("HTTP server stopped: {:?}", result);
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    }
}
