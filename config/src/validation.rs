//! # Configuration Validation
//!
//! Provides validation for the dialogue configuration using the `validator`
//! crate, surfacing failures as configuration errors.

use errors::DialogueError;
use validator::Validate;

use crate::config::DialogueConfig;

/// Validate a fully merged configuration.
///
/// ## Validation Rules
/// ### Endpoint
/// - `scheme`: "ws" or "wss"
/// - `host`: 1-255 characters
/// - `path`: must start with '/'
///
/// ### Session
/// - `connect_timeout_ms`: 1-120000
/// - `temperature`: 0.0-1.0
/// - `max_tokens`: 1-8192
///
/// ### Retry
/// - `max_retries`: 0-10
///
/// ### Observability
/// - `log_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate(config: &DialogueConfig) -> Result<(), DialogueError> {
    config
        .validate()
        .map_err(|errors| DialogueError::configuration(format!("invalid configuration: {errors}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate(&DialogueConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_reports_field() {
        let mut config = DialogueConfig::default();
        config.session.max_tokens = 0;
        let err = validate(&config).unwrap_err();
        assert_eq!(err.kind(), errors::ErrorKind::ConfigurationError);
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_validate_rejects_excessive_retries() {
        let mut config = DialogueConfig::default();
        config.retry.max_retries = 50;
        assert!(validate(&config).is_err());
    }
}
