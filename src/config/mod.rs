mod file_config;

pub use file_config::{ExtractionConfig, FileConfig, LlmConfig, SearchConfig, StylesConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Identity used when a request carries no user id.
pub const DEFAULT_USER_ID: &str = "97b40a42-c939-402f-bf70-e40989142552";

/// Environment variables consulted, in order, when no LLM key is configured.
const API_KEY_ENV_VARS: &[&str] = &["CLAUDE_API_KEY", "ANTHROPIC_API_KEY"];

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub default_user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub default_user_id: String,

    // Feature configs (with defaults)
    pub llm: LlmSettings,
    pub extraction: ExtractionSettings,
    pub search: SearchSettings,
    pub styles: StyleSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let default_user_id = file
            .default_user_id
            .or_else(|| cli.default_user_id.clone())
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let llm = LlmSettings::resolve(file.llm.unwrap_or_default())?;

        let extraction_file = file.extraction.unwrap_or_default();
        let extraction_defaults = ExtractionSettings::default();
        let extraction = ExtractionSettings {
            user_agent: extraction_file
                .user_agent
                .unwrap_or(extraction_defaults.user_agent),
            timeout_secs: extraction_file
                .timeout_secs
                .unwrap_or(extraction_defaults.timeout_secs),
            max_retries: extraction_file
                .max_retries
                .unwrap_or(extraction_defaults.max_retries),
            initial_backoff_ms: extraction_file
                .initial_backoff_ms
                .unwrap_or(extraction_defaults.initial_backoff_ms),
            backoff_multiplier: extraction_file
                .backoff_multiplier
                .unwrap_or(extraction_defaults.backoff_multiplier),
            max_backoff_ms: extraction_file
                .max_backoff_ms
                .unwrap_or(extraction_defaults.max_backoff_ms),
        };

        let search_file = file.search.unwrap_or_default();
        let search_defaults = SearchSettings::default();
        let engine = match search_file.engine {
            Some(name) => SearchEngine::parse(&name)?,
            None => search_defaults.engine,
        };
        let search = SearchSettings {
            engine,
            feed_url_template: search_file
                .feed_url_template
                .unwrap_or(search_defaults.feed_url_template),
            max_results: search_file
                .max_results
                .unwrap_or(search_defaults.max_results),
        };
        if search.engine == SearchEngine::Feed && !search.feed_url_template.contains("{query}") {
            bail!("search.feed_url_template must contain a {{query}} placeholder");
        }

        let styles_file = file.styles.unwrap_or_default();
        let styles = StyleSettings {
            default_directive: styles_file.default_directive,
            directives: styles_file.directives,
        };

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            default_user_id,
            llm,
            extraction,
            search,
            styles,
        })
    }

    pub fn store_db_path(&self) -> PathBuf {
        self.db_dir.join("introfuse.db")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Anthropic,
    OpenAi,
}

impl LlmProviderKind {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => bail!("Unknown llm provider: {}", other),
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-sonnet-20241022",
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

/// Settings for the LLM provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl LlmSettings {
    fn resolve(file: LlmConfig) -> Result<Self> {
        let provider = match file.provider {
            Some(name) => LlmProviderKind::parse(&name)?,
            None => LlmProviderKind::Anthropic,
        };
        let defaults = Self::defaults_for(provider);

        let api_key = file.api_key.filter(|k| !k.trim().is_empty()).or_else(|| {
            (file.api_key_command.is_none() && provider == LlmProviderKind::Anthropic)
                .then(api_key_from_env)
                .flatten()
        });

        let temperature = file.temperature.unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            bail!("llm.temperature must be between 0.0 and 2.0, got {}", temperature);
        }

        Ok(Self {
            provider,
            base_url: file
                .base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: file.model.unwrap_or(defaults.model),
            api_key,
            api_key_command: file.api_key_command,
            max_tokens: file.max_tokens.unwrap_or(defaults.max_tokens),
            temperature,
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        })
    }

    fn defaults_for(provider: LlmProviderKind) -> Self {
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            api_key: None,
            api_key_command: None,
            max_tokens: 4000,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self::defaults_for(LlmProviderKind::Anthropic)
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Settings for fetching pages of `url` content sources.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// 0 keeps the single-attempt behaviour.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            max_retries: 0,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Static,
    Feed,
}

impl SearchEngine {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "feed" | "rss" => Ok(Self::Feed),
            other => bail!("Unknown search engine: {}", other),
        }
    }
}

/// Settings for the search fallback used by `search` content sources.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub engine: SearchEngine,
    pub feed_url_template: String,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engine: SearchEngine::Static,
            feed_url_template:
                "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en"
                    .to_string(),
            max_results: 5,
        }
    }
}

/// Style directive overrides from the config file.
#[derive(Debug, Clone, Default)]
pub struct StyleSettings {
    pub default_directive: Option<String>,
    pub directives: BTreeMap<String, String>,
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
