//! Command-line and environment configuration for the server binary.
//!
//! Every flag falls back to an environment variable, and a `.env` file in the
//! working directory is loaded before parsing, so the same settings can come
//! from the shell, the process environment, or a dotenv file.

use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};

use crate::network::{AppConfig, NetworkConfig};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-line output.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Pet Store REST API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "petstore-server", version, about)]
pub struct ServerArgs {
    /// Display name reported by the root endpoint.
    #[arg(long, env = "APP_NAME", default_value = "Pet Store API")]
    pub app_name: String,

    /// Enable debug logging. The variable accepts `1`/`0`, `true`/`false`,
    /// `yes`/`no` and `on`/`off`, case-insensitively.
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on (0 picks a free port).
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Comma-separated CORS origins; `*` allows any origin.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub allowed_origins: Vec<String>,

    /// Deployment environment label.
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Preload the demo pets and users at startup.
    #[arg(
        long,
        env = "SAMPLE_DATA",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub sample_data: bool,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    /// Loads `.env` if present, then parses the process arguments.
    #[must_use]
    pub fn load() -> Self {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self
                .allowed_origins
                .iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            app_name: self.app_name.clone(),
            environment: self.environment.clone(),
            debug: self.debug,
        }
    }
}
