use serde::Deserialize;

use crate::config::environment::Environment;
use crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS;

/// ================================
/// Full service configuration (binary)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub client: ClientConfig,
    pub logging: Option<LoggingConfig>,
    pub callback: Option<CallbackServerConfig>,
}

/// ================================
/// API client
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub environment: Environment,
    /// overrides `environment` when set
    pub base_url: Option<String>,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub log_requests: bool,
    pub retry: Option<RetryConfig>,
}

impl ClientConfig {
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_owned()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.filter(|t| *t > 0).unwrap_or(DEFAULT_HTTP_TIMEOUT_MS)
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    /// multiplied by `multiplier` after every failed attempt, up to max_backoff_ms
    pub initial_backoff_ms: Option<u64>,
    /// invariant: >= initial_backoff_ms
    pub max_backoff_ms: Option<u64>,
    pub multiplier: Option<f64>,
}

/// ================================
/// Callback receiver
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CallbackServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_callback_path")]
    pub path: String,
    pub metrics_path: Option<String>,
}

impl Default for CallbackServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_callback_path(),
            metrics_path: Some("/metrics".to_owned()),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_callback_path() -> String {
    "/payara/callback".to_string()
}
