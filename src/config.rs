//! Configuration management for the Selective Extraction server

use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub matcher: MatcherConfig,
    pub documents: DocumentsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Remote word-matcher endpoint settings
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    pub base_url: String,
    pub highlight_path: String,
    pub health_path: String,
    pub timeout_secs: u64,
    pub health_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    pub max_upload_bytes: usize,
    /// Cap on decompressed DOCX content
    pub max_expanded_bytes: usize,
    pub max_documents: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl MatcherConfig {
    pub fn highlight_url(&self) -> String {
        join_url(&self.base_url, &self.highlight_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            matcher: MatcherConfig {
                base_url: "http://127.0.0.1:5001".to_string(),
                highlight_path: "/api/highlight".to_string(),
                health_path: "/api/hello".to_string(),
                timeout_secs: 30,
                health_interval_secs: 10,
            },
            documents: DocumentsConfig {
                max_upload_bytes: 25 * 1024 * 1024,
                max_expanded_bytes: 64 * 1024 * 1024,
                max_documents: 32,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            matcher: MatcherConfig {
                base_url: env::var("MATCHER_URL").unwrap_or(defaults.matcher.base_url),
                highlight_path: env::var("MATCHER_HIGHLIGHT_PATH")
                    .unwrap_or(defaults.matcher.highlight_path),
                health_path: env::var("MATCHER_HEALTH_PATH")
                    .unwrap_or(defaults.matcher.health_path),
                timeout_secs: parse_var("MATCHER_TIMEOUT_SECS", defaults.matcher.timeout_secs)?,
                health_interval_secs: parse_var(
                    "MATCHER_HEALTH_INTERVAL_SECS",
                    defaults.matcher.health_interval_secs,
                )?,
            },
            documents: DocumentsConfig {
                max_upload_bytes: parse_var(
                    "MAX_UPLOAD_BYTES",
                    defaults.documents.max_upload_bytes,
                )?,
                max_expanded_bytes: parse_var(
                    "MAX_EXPANDED_BYTES",
                    defaults.documents.max_expanded_bytes,
                )?,
                max_documents: parse_var("MAX_DOCUMENTS", defaults.documents.max_documents)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}
