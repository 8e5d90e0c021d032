//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)

use crate::config::{
    DialogueConfig, EndpointConfig, ObservabilityConfig, RetryConfig, SessionConfig,
};
use crate::credentials::CredentialsConfig;

/// Merge configuration sources, later sources winning.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// A field from a higher-priority source overrides the accumulated value
/// only when it differs from the default. A source that merely carries the
/// default therefore never clobbers a value set by a lower-priority source.
/// Credentials override whenever the higher source provides them.
///
/// ## Usage
/// ```rust,no_run
/// use config::{load_from_env, load_from_file, merge_configs};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("guide.toml"))?;
///     let from_env = load_from_env()?;
///     let _config = merge_configs(vec![(from_file, "file"), (from_env, "env")]);
///     Ok(())
/// }
/// ```
pub fn merge_configs(sources: Vec<(DialogueConfig, &str)>) -> DialogueConfig {
    sources
        .into_iter()
        .fold(DialogueConfig::default(), |base, (overlay, source_name)| {
            merge_with_logging(base, &overlay, source_name)
        })
}

fn merge_with_logging(
    mut base: DialogueConfig,
    overlay: &DialogueConfig,
    source_name: &str
) -> DialogueConfig {
    let mut changes = Vec::new();

    merge_credentials(&mut base.credentials, &overlay.credentials, &mut changes);
    merge_endpoint(&mut base.endpoint, &overlay.endpoint, &mut changes);
    merge_session(&mut base.session, &overlay.session, &mut changes);
    merge_retry(&mut base.retry, &overlay.retry, &mut changes);
    merge_observability(&mut base.observability, &overlay.observability, &mut changes);

    if !changes.is_empty() {
        tracing::debug!(source = source_name, ?changes, "Applied configuration overrides");
    }

    base
}

fn override_field<T: PartialEq + Clone>(
    base: &mut T,
    overlay: &T,
    default: &T,
    name: &str,
    changes: &mut Vec<String>
) {
    if *overlay != *default && *overlay != *base {
        *base = overlay.clone();
        changes.push(name.to_string());
    }
}

fn merge_credentials(
    base: &mut CredentialsConfig,
    overlay: &CredentialsConfig,
    changes: &mut Vec<String>
) {
    for (target, value, name) in [
        (&mut base.api_key, &overlay.api_key, "credentials.api_key"),
        (&mut base.api_secret, &overlay.api_secret, "credentials.api_secret"),
        (&mut base.app_id, &overlay.app_id, "credentials.app_id"),
    ] {
        if value.is_some() && *value != *target {
            target.clone_from(value);
            changes.push(name.to_string());
        }
    }
}

fn merge_endpoint(base: &mut EndpointConfig, overlay: &EndpointConfig, changes: &mut Vec<String>) {
    let default = EndpointConfig::default();
    override_field(&mut base.scheme, &overlay.scheme, &default.scheme, "endpoint.scheme", changes);
    override_field(&mut base.host, &overlay.host, &default.host, "endpoint.host", changes);
    override_field(&mut base.path, &overlay.path, &default.path, "endpoint.path", changes);
    override_field(&mut base.method, &overlay.method, &default.method, "endpoint.method", changes);
}

fn merge_session(base: &mut SessionConfig, overlay: &SessionConfig, changes: &mut Vec<String>) {
    let default = SessionConfig::default();
    override_field(
        &mut base.connect_timeout_ms,
        &overlay.connect_timeout_ms,
        &default.connect_timeout_ms,
        "session.connect_timeout_ms",
        changes
    );
    override_field(&mut base.domain, &overlay.domain, &default.domain, "session.domain", changes);
    override_field(
        &mut base.temperature,
        &overlay.temperature,
        &default.temperature,
        "session.temperature",
        changes
    );
    override_field(
        &mut base.max_tokens,
        &overlay.max_tokens,
        &default.max_tokens,
        "session.max_tokens",
        changes
    );
    override_field(
        &mut base.default_language,
        &overlay.default_language,
        &default.default_language,
        "session.default_language",
        changes
    );
}

fn merge_retry(base: &mut RetryConfig, overlay: &RetryConfig, changes: &mut Vec<String>) {
    let default = RetryConfig::default();
    override_field(
        &mut base.max_retries,
        &overlay.max_retries,
        &default.max_retries,
        "retry.max_retries",
        changes
    );
    override_field(
        &mut base.initial_delay_ms,
        &overlay.initial_delay_ms,
        &default.initial_delay_ms,
        "retry.initial_delay_ms",
        changes
    );
    override_field(
        &mut base.max_delay_ms,
        &overlay.max_delay_ms,
        &default.max_delay_ms,
        "retry.max_delay_ms",
        changes
    );
}

fn merge_observability(
    base: &mut ObservabilityConfig,
    overlay: &ObservabilityConfig,
    changes: &mut Vec<String>
) {
    let default = ObservabilityConfig::default();
    override_field(
        &mut base.log_level,
        &overlay.log_level,
        &default.log_level,
        "observability.log_level",
        changes
    );
    override_field(
        &mut base.json_logs,
        &overlay.json_logs,
        &default.json_logs,
        "observability.json_logs",
        changes
    );
}
