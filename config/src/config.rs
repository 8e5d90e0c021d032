//! # Configuration Structures
//!
//! This module defines the configuration structures for dialogue sessions.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Fall back to the service defaults for every omitted field

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::credentials::CredentialsConfig;

/// Main configuration structure for the dialogue client.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates everything a session needs before it can be signed and
/// opened: credentials, remote endpoint, generation parameters, the caller
/// retry policy and logging preferences.
///
/// ## Usage
/// ```rust,no_run
/// use config::DialogueConfig;
///
/// let config = DialogueConfig::default();
/// println!("Endpoint host: {}", config.endpoint.host);
/// ```
///
/// ## Validation
/// All nested configurations must pass their own validation rules.
/// Credentials are checked separately by
/// [`CredentialsConfig::resolve`](crate::CredentialsConfig::resolve) so that a
/// partially configured file can still be merged with the environment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct DialogueConfig {
    /// Public key identifier, shared signing secret and application id
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Remote inference endpoint
    #[serde(default)]
    #[validate(nested)]
    pub endpoint: EndpointConfig,

    /// Per-session timing and generation parameters
    #[serde(default)]
    #[validate(nested)]
    pub session: SessionConfig,

    /// Caller-side retry policy
    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,

    /// Logging configuration
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// Remote endpoint configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `scheme`: `wss` in production, `ws` for loopback testing (default: "wss")
/// - `host`: Host (and optional port) signed into the request (default:
///   "spark-api.xfyun.cn")
/// - `path`: Request path (default: "/v1.1/chat")
/// - `method`: Request-line method used in the signature (default: "GET")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct EndpointConfig {
    #[serde(default = "default_scheme")]
    #[validate(custom(function = "validate_scheme"))]
    pub scheme: String,

    #[serde(default = "default_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_path")]
    #[validate(custom(function = "validate_path"))]
    pub path: String,

    #[serde(default = "default_method")]
    #[validate(length(min = 1, max = 16))]
    pub method: String
}

pub(crate) fn default_scheme() -> String {
    "wss".to_string()
}

pub(crate) fn default_host() -> String {
    "spark-api.xfyun.cn".to_string()
}

pub(crate) fn default_path() -> String {
    "/v1.1/chat".to_string()
}

pub(crate) fn default_method() -> String {
    "GET".to_string()
}

fn validate_scheme(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "ws" | "wss" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid endpoint scheme"))
    }
}

fn validate_path(value: &str) -> Result<(), validator::ValidationError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(validator::ValidationError::new(
            "Endpoint path must start with '/'"
        ))
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            path: default_path(),
            method: default_method()
        }
    }
}

/// Session timing and generation configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Fields
/// - `connect_timeout_ms`: Budget for the connection to become ready
///   (default: 10000)
/// - `domain`: Model domain requested in the payload (default: "general")
/// - `temperature`: Sampling temperature (default: 0.5)
/// - `max_tokens`: Maximum answer length in tokens (default: 1024)
/// - `default_language`: Language used when the caller passes an empty code
///   (default: "zh")
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SessionConfig {
    #[serde(default = "default_connect_timeout_ms")]
    #[validate(range(min = 1, max = 120_000))]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_domain")]
    #[validate(length(min = 1, max = 64))]
    pub domain: String,

    #[serde(default = "default_temperature")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    #[validate(range(min = 1, max = 8192))]
    pub max_tokens: u32,

    #[serde(default = "default_language")]
    #[validate(length(min = 1, max = 16))]
    pub default_language: String
}

pub(crate) fn default_connect_timeout_ms() -> u64 {
    10_000
}

pub(crate) fn default_domain() -> String {
    "general".to_string()
}

pub(crate) fn default_temperature() -> f32 {
    0.5
}

pub(crate) fn default_max_tokens() -> u32 {
    1024
}

pub(crate) fn default_language() -> String {
    "zh".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            domain: default_domain(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            default_language: default_language()
        }
    }
}

/// Caller-side retry policy.
///
/// Sessions never retry internally. This policy is only consulted by
/// callers that opt into retrying with a brand-new session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RetryConfig {
    /// Extra attempts after the first one (0 disables retrying)
    #[serde(default)]
    #[validate(range(max = 10))]
    pub max_retries: u32,

    #[serde(default = "default_initial_delay_ms")]
    #[validate(range(min = 1, max = 60_000))]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    #[validate(range(min = 1, max = 300_000))]
    pub max_delay_ms: u64
}

pub(crate) fn default_initial_delay_ms() -> u64 {
    500
}

pub(crate) fn default_max_delay_ms() -> u64 {
    5000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms()
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    /// Logging level (trace/debug/info/warn/error)
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub log_level: String,

    /// Emit JSON formatted log lines
    #[serde(default)]
    pub json_logs: bool
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

fn validate_log_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid log level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = DialogueConfig::default();
        assert_eq!(config.endpoint.scheme, "wss");
        assert_eq!(config.endpoint.host, "spark-api.xfyun.cn");
        assert_eq!(config.endpoint.path, "/v1.1/chat");
        assert_eq!(config.endpoint.method, "GET");
        assert_eq!(config.session.connect_timeout_ms, 10_000);
        assert_eq!(config.session.domain, "general");
        assert_eq!(config.session.temperature, 0.5);
        assert_eq!(config.session.max_tokens, 1024);
        assert_eq!(config.session.default_language, "zh");
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let mut config = DialogueConfig::default();
        config.endpoint.scheme = "https".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_path_rejected() {
        let mut config = DialogueConfig::default();
        config.endpoint.path = "v1.1/chat".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let mut config = DialogueConfig::default();
        config.session.temperature = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = DialogueConfig::default();
        config.session.connect_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = DialogueConfig::default();
        config.observability.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
