use super::provider::LlmError;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of API key for authentication.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// No authentication.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl ApiKeySource {
    /// A command wins over a static key when both are configured.
    pub fn from_settings(api_key: Option<String>, api_key_command: Option<String>) -> Self {
        match (api_key_command, api_key) {
            (Some(cmd), _) => ApiKeySource::Command(cmd),
            (None, Some(key)) => ApiKeySource::Static(key),
            (None, None) => ApiKeySource::None,
        }
    }

    /// Get the current API key, executing the command if necessary.
    pub async fn get_key(&self) -> Result<Option<String>, LlmError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(LlmError::Connection(format!(
                            "Failed to execute api_key_command: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(LlmError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(LlmError::Connection(format!(
                        "api_key_command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    return Err(LlmError::Connection(
                        "api_key_command returned empty key".to_string(),
                    ));
                }
                Ok(Some(key))
            }
        }
    }
}
