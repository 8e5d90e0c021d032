//! Typed session events and the observer seam UI layers subscribe through.

use errors::ErrorKind;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::protocol::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    StateChanged {
        session_uid: String,
        from: SessionState,
        to: SessionState
    },
    ChunkReceived {
        session_uid: String,
        sequence: usize,
        chunk: String
    },
    Completed {
        session_uid: String,
        full_text: String
    },
    Failed {
        session_uid: String,
        error_kind: ErrorKind,
        error_message: String
    }
}

impl SessionEvent {
    pub fn session_uid(&self) -> &str {
        match self {
            Self::StateChanged { session_uid, .. }
            | Self::ChunkReceived { session_uid, .. }
            | Self::Completed { session_uid, .. }
            | Self::Failed { session_uid, .. } => session_uid
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

/// Receives every event a session emits, in order, from the session's
/// driver task. Implementations must not block.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&self, _event: &SessionEvent) {}
}

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<SessionEvent>
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SessionObserver for ChannelObserver {
    fn on_event(&self, event: &SessionEvent) {
        if self.sender.send(event.clone()).is_err() {
            tracing::trace!(session_uid = %event.session_uid(), "Event receiver dropped");
        }
    }
}

/// Logs events through `tracing`.
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::StateChanged {
                session_uid,
                from,
                to
            } => {
                tracing::debug!(%session_uid, ?from, ?to, "Session state changed");
            }
            SessionEvent::ChunkReceived {
                session_uid,
                sequence,
                chunk
            } => {
                tracing::trace!(%session_uid, sequence, bytes = chunk.len(), "Chunk received");
            }
            SessionEvent::Completed {
                session_uid,
                full_text
            } => {
                tracing::info!(%session_uid, bytes = full_text.len(), "Session completed");
            }
            SessionEvent::Failed {
                session_uid,
                error_kind,
                error_message
            } => {
                tracing::warn!(%session_uid, %error_kind, error = %error_message, "Session failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_events() {
        let (observer, mut receiver) = ChannelObserver::new();
        let event = SessionEvent::Completed {
            session_uid: "uid-1".to_string(),
            full_text: "done".to_string()
        };
        observer.on_event(&event);
        assert_eq!(receiver.try_recv().unwrap(), event);
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (observer, receiver) = ChannelObserver::new();
        drop(receiver);
        observer.on_event(&SessionEvent::ChunkReceived {
            session_uid: "uid-1".to_string(),
            sequence: 1,
            chunk: "a".to_string()
        });
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = SessionEvent::Failed {
            session_uid: "uid-2".to_string(),
            error_kind: ErrorKind::RemoteRejected,
            error_message: "quota".to_string()
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "failed");
        assert_eq!(value["error_kind"], "remote_rejected");
        assert!(event.is_terminal());
        assert_eq!(event.session_uid(), "uid-2");
    }
}
