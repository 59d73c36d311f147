use anyhow::{Context, Result};
use clap::Args;
use reqwest::Url;
use std::path::PathBuf;

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct CliArgs {
    /// Base URL of the RODO admin API
    #[arg(
        short = 'u',
        long,
        env = "RODO_BASE_URL",
        default_value = "http://localhost:5000/api/v1"
    )]
    pub base_url: String,

    /// Path to the session database
    #[arg(short = 's', long, env = "RODO_SESSION_FILE")]
    pub session_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30")]
    pub http_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    // API endpoint
    pub base_url: Url,

    // Session storage
    pub session_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Build configuration with priority: CLI > ENV > defaults
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let base_url = Url::parse(&args.base_url)
            .with_context(|| format!("Invalid RODO_BASE_URL: {}", args.base_url))?;

        let session_file = args
            .session_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_session_file);

        let config = Config {
            base_url,
            session_file,

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            http_request_timeout: args.http_timeout,

            log_level: args.log_level.clone(),
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("Unsupported base URL scheme: {}", other),
        }

        if self.base_url.host_str().is_none() {
            anyhow::bail!("Base URL has no host: {}", self.base_url);
        }

        Ok(())
    }
}

/// Default location for the session database
fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("rodo-admin/session.sqlite3"))
        .unwrap_or_else(|| PathBuf::from(".rodo-admin-session.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&path[2..]);
        }
    }
    PathBuf::from(path)
}
