//! # Credentials
//!
//! The three externally supplied secrets every session needs.
//!
//! [`CredentialsConfig`] is the loose, mergeable shape read from files and
//! the environment. [`Credentials`] is the resolved form: all three values
//! are present and non-blank, and the signing secret is wiped on drop.

use std::fmt;

use errors::DialogueError;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Unresolved credentials as they appear in configuration sources.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CredentialsConfig {
    /// Public API key identifier
    #[serde(default)]
    pub api_key: Option<String>,

    /// Shared signing secret
    #[serde(default)]
    pub api_secret: Option<String>,

    /// Application identifier sent in every payload header
    #[serde(default)]
    pub app_id: Option<String>
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "***"))
            .field("app_id", &self.app_id.as_ref().map(|_| "***"))
            .finish()
    }
}

impl CredentialsConfig {
    /// Resolve into [`Credentials`].
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Checks that all secrets are present before any session is started.
    ///
    /// ## Error Handling
    /// Returns `DialogueError::Configuration` naming every missing or blank
    /// field. No network activity can happen before this succeeds.
    pub fn resolve(&self) -> Result<Credentials, DialogueError> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let api_key = present(&self.api_key);
        let api_secret = present(&self.api_secret);
        let app_id = present(&self.app_id);

        let mut missing = Vec::new();
        if api_key.is_none() {
            missing.push("api_key");
        }
        if api_secret.is_none() {
            missing.push("api_secret");
        }
        if app_id.is_none() {
            missing.push("app_id");
        }

        match (api_key, api_secret, app_id) {
            (Some(api_key), Some(api_secret), Some(app_id)) => Ok(Credentials {
                api_key,
                api_secret,
                app_id
            }),
            _ => Err(DialogueError::configuration(format!(
                "missing credentials: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Resolved credentials. Construct through [`CredentialsConfig::resolve`] or
/// [`Credentials::new`].
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    app_id: String
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        app_id: impl Into<String>
    ) -> Result<Self, DialogueError> {
        CredentialsConfig {
            api_key: Some(api_key.into()),
            api_secret: Some(api_secret.into()),
            app_id: Some(app_id.into())
        }
        .resolve()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("app_id", &self.app_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_complete_credentials() {
        let config = CredentialsConfig {
            api_key: Some("key".to_string()),
            api_secret: Some(" secret ".to_string()),
            app_id: Some("app".to_string())
        };
        let credentials = config.resolve().unwrap();
        assert_eq!(credentials.api_key(), "key");
        assert_eq!(credentials.api_secret(), "secret");
        assert_eq!(credentials.app_id(), "app");
    }

    #[test]
    fn test_resolve_names_every_missing_field() {
        let config = CredentialsConfig {
            api_key: Some("key".to_string()),
            api_secret: None,
            app_id: Some("   ".to_string())
        };
        let err = config.resolve().unwrap_err();
        assert_eq!(
            err,
            DialogueError::configuration("missing credentials: api_secret, app_id")
        );
    }

    #[test]
    fn test_empty_config_is_configuration_error() {
        let err = CredentialsConfig::default().resolve().unwrap_err();
        assert_eq!(err.kind(), errors::ErrorKind::ConfigurationError);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::new("key", "very-secret", "app").unwrap();
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("very-secret"));

        let config = CredentialsConfig {
            api_key: Some("k".to_string()),
            api_secret: Some("very-secret".to_string()),
            app_id: None
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
