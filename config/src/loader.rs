//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `XINGHUO_*`: Credentials issued by the inference service
//! - `GUIDE_*`: Endpoint, session, retry and logging settings

use std::env;

use errors::DialogueError;

use crate::config::{
    DialogueConfig, EndpointConfig, ObservabilityConfig, RetryConfig, SessionConfig,
    default_connect_timeout_ms, default_domain, default_host, default_initial_delay_ms,
    default_language, default_log_level, default_max_delay_ms, default_max_tokens,
    default_method, default_path, default_scheme, default_temperature,
};
use crate::credentials::CredentialsConfig;

/// Load configuration from environment variables.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads configuration from environment variables. Unset variables keep
/// their default values; a variable that is set but cannot be parsed is a
/// configuration error rather than being silently ignored.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Endpoint host: {}", config.endpoint.host);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### Credentials (`XINGHUO_*`)
/// - `XINGHUO_API_KEY`: Public key identifier
/// - `XINGHUO_API_SECRET`: Shared signing secret
/// - `XINGHUO_APP_ID`: Application identifier
///
/// ### Endpoint (`GUIDE_*`)
/// - `GUIDE_SCHEME`: ws/wss (default: "wss")
/// - `GUIDE_HOST`: Host signed into the request (default: "spark-api.xfyun.cn")
/// - `GUIDE_PATH`: Request path (default: "/v1.1/chat")
///
/// ### Session (`GUIDE_*`)
/// - `GUIDE_CONNECT_TIMEOUT_MS`: Ready budget in ms (default: 10000)
/// - `GUIDE_DOMAIN`: Model domain (default: "general")
/// - `GUIDE_TEMPERATURE`: Sampling temperature (default: 0.5)
/// - `GUIDE_MAX_TOKENS`: Maximum answer tokens (default: 1024)
/// - `GUIDE_DEFAULT_LANGUAGE`: Fallback language code (default: "zh")
///
/// ### Retry (`GUIDE_RETRY_*`)
/// - `GUIDE_RETRY_MAX`: Extra attempts (default: 0)
/// - `GUIDE_RETRY_INITIAL_DELAY_MS`: First backoff delay (default: 500)
/// - `GUIDE_RETRY_MAX_DELAY_MS`: Backoff ceiling (default: 5000)
///
/// ### Observability
/// - `GUIDE_LOG_LEVEL`: trace/debug/info/warn/error (default: "info")
/// - `GUIDE_JSON_LOGS`: true/false (default: false)
pub fn load_from_env() -> Result<DialogueConfig, DialogueError> {
    Ok(DialogueConfig {
        credentials: load_credentials_from_env(),
        endpoint: load_endpoint_from_env(),
        session: load_session_from_env()?,
        retry: load_retry_from_env()?,
        observability: load_observability_from_env()?
    })
}

fn load_credentials_from_env() -> CredentialsConfig {
    CredentialsConfig {
        api_key: env::var("XINGHUO_API_KEY").ok(),
        api_secret: env::var("XINGHUO_API_SECRET").ok(),
        app_id: env::var("XINGHUO_APP_ID").ok()
    }
}

fn load_endpoint_from_env() -> EndpointConfig {
    EndpointConfig {
        scheme: env::var("GUIDE_SCHEME").unwrap_or_else(|_| default_scheme()),
        host: env::var("GUIDE_HOST").unwrap_or_else(|_| default_host()),
        path: env::var("GUIDE_PATH").unwrap_or_else(|_| default_path()),
        method: default_method()
    }
}

fn load_session_from_env() -> Result<SessionConfig, DialogueError> {
    Ok(SessionConfig {
        connect_timeout_ms: parse_env_or("GUIDE_CONNECT_TIMEOUT_MS", default_connect_timeout_ms())?,
        domain: env::var("GUIDE_DOMAIN").unwrap_or_else(|_| default_domain()),
        temperature: parse_env_or("GUIDE_TEMPERATURE", default_temperature())?,
        max_tokens: parse_env_or("GUIDE_MAX_TOKENS", default_max_tokens())?,
        default_language: env::var("GUIDE_DEFAULT_LANGUAGE").unwrap_or_else(|_| default_language())
    })
}

fn load_retry_from_env() -> Result<RetryConfig, DialogueError> {
    Ok(RetryConfig {
        max_retries: parse_env_or("GUIDE_RETRY_MAX", 0)?,
        initial_delay_ms: parse_env_or("GUIDE_RETRY_INITIAL_DELAY_MS", default_initial_delay_ms())?,
        max_delay_ms: parse_env_or("GUIDE_RETRY_MAX_DELAY_MS", default_max_delay_ms())?
    })
}

fn load_observability_from_env() -> Result<ObservabilityConfig, DialogueError> {
    Ok(ObservabilityConfig {
        log_level: env::var("GUIDE_LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
        json_logs: parse_env_or("GUIDE_JSON_LOGS", false)?
    })
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, DialogueError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            DialogueError::configuration(format!("{key} has invalid value '{raw}': {e}"))
        }),
        Err(_) => Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "XINGHUO_API_KEY",
        "XINGHUO_API_SECRET",
        "XINGHUO_APP_ID",
        "GUIDE_SCHEME",
        "GUIDE_HOST",
        "GUIDE_PATH",
        "GUIDE_CONNECT_TIMEOUT_MS",
        "GUIDE_DOMAIN",
        "GUIDE_TEMPERATURE",
        "GUIDE_MAX_TOKENS",
        "GUIDE_DEFAULT_LANGUAGE",
        "GUIDE_RETRY_MAX",
        "GUIDE_RETRY_INITIAL_DELAY_MS",
        "GUIDE_RETRY_MAX_DELAY_MS",
        "GUIDE_LOG_LEVEL",
        "GUIDE_JSON_LOGS",
    ];

    fn clear_vars() {
        for var in VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_vars();
        let config = load_from_env().unwrap();
        assert_eq!(config, DialogueConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_vars();
        unsafe {
            env::set_var("XINGHUO_API_KEY", "key-from-env");
            env::set_var("XINGHUO_API_SECRET", "secret-from-env");
            env::set_var("XINGHUO_APP_ID", "app-from-env");
            env::set_var("GUIDE_HOST", "127.0.0.1:9001");
            env::set_var("GUIDE_CONNECT_TIMEOUT_MS", "2500");
            env::set_var("GUIDE_RETRY_MAX", "2");
            env::set_var("GUIDE_JSON_LOGS", "true");
        }

        let config = load_from_env().unwrap();
        assert_eq!(config.credentials.api_key.as_deref(), Some("key-from-env"));
        assert_eq!(config.endpoint.host, "127.0.0.1:9001");
        assert_eq!(config.session.connect_timeout_ms, 2500);
        assert_eq!(config.retry.max_retries, 2);
        assert!(config.observability.json_logs);
        assert!(config.credentials.resolve().is_ok());

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_malformed_number_is_configuration_error() {
        clear_vars();
        unsafe {
            env::set_var("GUIDE_TEMPERATURE", "warm");
        }

        let err = load_from_env().unwrap_err();
        assert_eq!(err.kind(), errors::ErrorKind::ConfigurationError);
        assert!(err.to_string().contains("GUIDE_TEMPERATURE"));

        clear_vars();
    }

    #[test]
    fn test_parse_env_or_missing_uses_default() {
        let value: u32 = parse_env_or("GUIDE_NONEXISTENT_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }
}
