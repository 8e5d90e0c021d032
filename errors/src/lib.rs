//! # Dialogue Errors
//!
//! Error taxonomy for signed streaming dialogue sessions.
//!
//! Every error is terminal for the session that raised it. The session
//! never retries on its own; callers that want a retry start a fresh
//! session (and therefore a fresh signature).
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields in every message
//! - `ErrorKind` gives UI layers a stable, serialisable classification

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable classification of a [`DialogueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationError,
    ConnectionTimeout,
    TransportError,
    MalformedFrame,
    RemoteRejected,
    Cancelled
}

impl ErrorKind {
    /// Label used for log fields and metric tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::ConnectionTimeout => "connection_timeout",
            Self::TransportError => "transport_error",
            Self::MalformedFrame => "malformed_frame",
            Self::RemoteRejected => "remote_rejected",
            Self::Cancelled => "cancelled"
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by a dialogue session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DialogueError {
    /// Missing secrets or invalid input, raised before any network activity.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Connection timeout: not ready after {timeout_ms}ms")]
    ConnectionTimeout { timeout_ms: u64 },

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Malformed frame: {reason}")]
    MalformedFrame { reason: String },

    /// The remote service answered with a non-zero status code.
    #[error("Remote rejected request with code {code}: {message}")]
    RemoteRejected {
        code: i64,
        message: String,
        sid: Option<String>
    },

    #[error("Session cancelled")]
    Cancelled
}

impl DialogueError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into()
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into()
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            reason: reason.into()
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::ConfigurationError,
            Self::ConnectionTimeout { .. } => ErrorKind::ConnectionTimeout,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::MalformedFrame { .. } => ErrorKind::MalformedFrame,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::Cancelled => ErrorKind::Cancelled
        }
    }

    /// Whether a caller may reasonably try again with a new session.
    ///
    /// Only network-level failures qualify. A rejection by the service or a
    /// malformed stream would repeat identically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::Transport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DialogueError>;
