//! # Configuration System
//!
//! Centralized configuration management for dialogue sessions.
//!
//! This crate provides:
//! - Configuration structures for credentials, endpoint, session, retry and
//!   logging
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation
//!
//! # Best Practices
//!
//! - Uses `validator` crate for input validation
//! - Secrets never appear in `Debug` output and are wiped on drop

pub mod config;
pub mod credentials;
pub mod file_loader;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{
    DialogueConfig, EndpointConfig, ObservabilityConfig, RetryConfig, SessionConfig,
};
pub use credentials::{Credentials, CredentialsConfig};
pub use file_loader::{ConfigFileError, ConfigFormat, load_from_file, load_from_str};
pub use loader::load_from_env;
pub use precedence::merge_configs;
pub use validation::validate;
