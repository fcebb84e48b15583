use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub default_user_id: Option<String>,

    // Feature configs
    pub llm: Option<LlmConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub search: Option<SearchConfig>,
    pub styles: Option<StylesConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// "anthropic" or "openai"
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Shell command printing the API key, run before each request.
    pub api_key_command: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ExtractionConfig {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub max_backoff_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Search backing to use: "static" or "feed"
    pub engine: Option<String>,
    /// Feed URL with a `{query}` placeholder, used by the "feed" engine.
    pub feed_url_template: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StylesConfig {
    /// Directive used for style names with no entry.
    pub default_directive: Option<String>,
    /// Style name -> directive text, merged over the built-in table.
    pub directives: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
