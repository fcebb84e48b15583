use super::RequestsLoggingLevel;
use crate::config::DEFAULT_USER_ID;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub frontend_dir_path: Option<String>,
    /// Identity assigned to requests that do not name a user.
    pub default_user_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3010,
            metrics_port: 9093,
            frontend_dir_path: None,
            default_user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}
