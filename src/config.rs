//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Storage Backend
//!
//! `DATABASE_MODE` selects where entries live:
//!
//! - `in_mem` (default) - process memory, lost on restart
//! - `redis` - a Redis server
//!
//! ## Redis Connection
//!
//! ### Method 1: Full URL (simpler for local development)
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/7"
//! ```
//!
//! ### Method 2: Individual components (recommended for production)
//!
//! ```bash
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="7"
//! ```
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:8000`)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)
//! - `BROADCAST_QUEUE_CAPACITY` - Shared notification queue depth (default: 100)
//! - `SUBSCRIBER_BUFFER` - Per-watcher stream buffer depth (default: 32)
//! - `STATIC_DIR` - Directory served under `/static` (default: `./www`)
//! - `INDEX_FILE` - Page served at `GET /` (default: `./www/index.html`)

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::domain::broadcast::{DEFAULT_QUEUE_CAPACITY, DEFAULT_SUBSCRIBER_BUFFER};

const DEFAULT_LISTEN: &str = "0.0.0.0:8000";
const DEFAULT_REDIS_DB: &str = "7";
const MAX_QUEUE_CAPACITY: usize = 100_000;
const MAX_SUBSCRIBER_BUFFER: usize = 10_000;

/// Storage backend selected by `DATABASE_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseMode {
    InMem,
    Redis,
}

impl FromStr for DatabaseMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_mem" | "memory" => Ok(Self::InMem),
            "redis" => Ok(Self::Redis),
            other => anyhow::bail!("DATABASE_MODE must be 'in_mem' or 'redis', got '{}'", other),
        }
    }
}

impl fmt::Display for DatabaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMem => f.write_str("in_mem"),
            Self::Redis => f.write_str("redis"),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_mode: DatabaseMode,
    /// Only used when `database_mode` is [`DatabaseMode::Redis`].
    pub redis_url: String,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    pub broadcast_queue_capacity: usize,
    pub subscriber_buffer: usize,
    pub static_dir: String,
    pub index_file: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_MODE` names an unknown backend.
    pub fn from_env() -> Result<Self> {
        let database_mode = env::var("DATABASE_MODE")
            .map(|v| v.parse::<DatabaseMode>())
            .unwrap_or(Ok(DatabaseMode::InMem))
            .context("Failed to load storage configuration")?;

        let redis_url = Self::load_redis_url();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| DEFAULT_LISTEN.to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let broadcast_queue_capacity = env::var("BROADCAST_QUEUE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        let subscriber_buffer = env::var("SUBSCRIBER_BUFFER")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SUBSCRIBER_BUFFER);

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./www".to_string());
        let index_file =
            env::var("INDEX_FILE").unwrap_or_else(|_| "./www/index.html".to_string());

        Ok(Self {
            database_mode,
            redis_url,
            listen_addr,
            log_level,
            log_format,
            broadcast_queue_capacity,
            subscriber_buffer,
            static_dir,
            index_file,
        })
    }

    /// Loads Redis URL with fallback to component-based configuration.
    ///
    /// Priority:
    /// 1. `REDIS_URL` environment variable
    /// 2. Constructed from `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`
    pub(crate) fn load_redis_url() -> String {
        if let Ok(url) = env::var("REDIS_URL") {
            return url;
        }

        let host = env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
        let db = env::var("REDIS_DB").unwrap_or_else(|_| DEFAULT_REDIS_DB.to_string());

        match env::var("REDIS_PASSWORD") {
            Ok(pwd) if !pwd.is_empty() => format!("redis://:{}@{}:{}/{}", pwd, host, port, db),
            _ => format!("redis://{}:{}/{}", host, port, db),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a broadcast capacity is out of range
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - the Redis URL has the wrong scheme while Redis is selected
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_QUEUE_CAPACITY).contains(&self.broadcast_queue_capacity) {
            anyhow::bail!(
                "BROADCAST_QUEUE_CAPACITY must be between 1 and {}, got {}",
                MAX_QUEUE_CAPACITY,
                self.broadcast_queue_capacity
            );
        }

        if !(1..=MAX_SUBSCRIBER_BUFFER).contains(&self.subscriber_buffer) {
            anyhow::bail!(
                "SUBSCRIBER_BUFFER must be between 1 and {}, got {}",
                MAX_SUBSCRIBER_BUFFER,
                self.subscriber_buffer
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if self.database_mode == DatabaseMode::Redis
            && !self.redis_url.starts_with("redis://")
            && !self.redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(&self.redis_url)
            );
        }

        Ok(())
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Storage backend: {}", self.database_mode);

        if self.database_mode == DatabaseMode::Redis {
            tracing::info!("  Redis: {}", mask_connection_string(&self.redis_url));
        }

        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
        tracing::info!(
            "  Broadcast queue: {} (per-watcher buffer {})",
            self.broadcast_queue_capacity,
            self.subscriber_buffer
        );
        tracing::info!("  Static files: {} (index {})", self.static_dir, self.index_file);
    }
}

/// Masks sensitive information in connection strings for logging.
///
/// Replaces password with `***` in URLs like
/// `redis://:password@host:port/db` → `redis://:***@host:port/db`.
pub fn mask_connection_string(url: &str) -> String {
    if let Some(start) = url.find("://") {
        let scheme_end = start + 3;
        let rest = &url[scheme_end..];

        if let Some(at_pos) = rest.find('@') {
            let credentials = &rest[..at_pos];
            let host_part = &rest[at_pos..];

            if let Some(colon_pos) = credentials.rfind(':') {
                let username = &credentials[..colon_pos];
                return format!("{}://{}:***{}", &url[..start], username, host_part);
            }
        }
    }

    url.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
