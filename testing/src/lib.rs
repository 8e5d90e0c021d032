//! Shared test fixtures for the dialogue workspace.
//!
//! - [`ScriptedConnector`]: in-memory connections that replay a script of
//!   frames, closes, errors and stalls
//! - [`ScriptedWsServer`]: a real WebSocket server on loopback that records
//!   each upgrade request and payload, then replays frames
//! - frame builders producing the service's wire JSON

mod frames;
mod scripted;
mod server;

pub use frames::*;
pub use scripted::*;
pub use server::*;

use std::sync::atomic::{AtomicU32, Ordering};

use config::{Credentials, DialogueConfig};

static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

pub fn unique_id(prefix: &str) -> String {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}", prefix, id)
}

/// Credentials with unique, recognisable values.
pub fn test_credentials() -> Credentials {
    Credentials::new(unique_id("key"), unique_id("secret"), unique_id("app"))
        .unwrap_or_else(|e| panic!("test credentials must resolve: {e}"))
}

/// A configuration pointing at `host` over plain `ws`, with credentials
/// filled in.
pub fn test_config(host: &str) -> DialogueConfig {
    let mut config = DialogueConfig::default();
    config.credentials.api_key = Some(unique_id("key"));
    config.credentials.api_secret = Some(unique_id("secret"));
    config.credentials.app_id = Some(unique_id("app"));
    config.endpoint.scheme = "ws".to_string();
    config.endpoint.host = host.to_string();
    config
}
