//! Network configuration types for the Pet Store server.

use std::time::Duration;

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Allowed CORS origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Application-level settings surfaced by the informational endpoints.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Display name reported by `GET /`.
    pub app_name: String,
    /// Deployment environment label (`development`, `production`, ...).
    pub environment: String,
    /// Enables verbose logging.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Pet Store API".to_string(),
            environment: "development".to_string(),
            debug: false,
        }
    }
}
