//! Configuration loading from environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use ledger_repo::PostgresParts;

/// Filter used when neither `RUST_LOG` nor `LOG_LEVEL` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,ledger_app=debug,ledger_hex=debug";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Where the repository connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    /// `DATABASE_URL`; the scheme selects the backend.
    Url(String),
    /// PostgreSQL assembled from the `DB_*` variables.
    Parts(PostgresParts),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: Database,
    pub max_connections: u32,
    /// `None` when `REQUEST_TIMEOUT_SECS=0`.
    pub request_timeout: Option<Duration>,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = parse_or(&lookup, "PORT", 8080)?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?;

        let database = match non_empty(&lookup, "DATABASE_URL") {
            Some(url) => Database::Url(url),
            None => Database::Parts(postgres_parts(&lookup)?),
        };

        Ok(Self {
            port,
            database,
            max_connections,
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            log_level: non_empty(&lookup, "LOG_LEVEL"),
            log_format,
            otlp_endpoint: non_empty(&lookup, "OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The tracing filter directive to use when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

fn postgres_parts(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<PostgresParts> {
    Ok(PostgresParts {
        host: non_empty(lookup, "DB_HOST").unwrap_or_else(|| "localhost".into()),
        port: parse_or(lookup, "DB_PORT", 5432)?,
        database: non_empty(lookup, "DB_NAME").unwrap_or_else(|| "mydb".into()),
        username: non_empty(lookup, "DB_USER").unwrap_or_else(|| "user".into()),
        password: non_empty(lookup, "DB_PASS").unwrap_or_else(|| "password".into()),
    })
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {key} `{raw}`: {e}")),
        None => Ok(default),
    }
}
