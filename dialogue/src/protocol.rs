//! Session Protocol State Machine.
//!
//! Sans-IO: it consumes [`ConnectionEvent`]s and returns [`Directive`]s for
//! the driver to execute. It owns the session state and the aggregator, and
//! produces exactly one outcome.
//!
//! ```text
//! Idle -> Connecting -> AwaitingFirstFrame -> Streaming -> Completed
//!             |                 |                 |
//!             +-----------------+-----------------+----> Failed
//! ```
//!
//! Once `Completed` or `Failed` is reached every further event is ignored.

use std::fmt;
use std::sync::Arc;

use errors::DialogueError;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::aggregator::ResponseAggregator;
use crate::answer::GuideAnswer;
use crate::connection::ConnectionEvent;
use crate::events::{SessionEvent, SessionObserver};
use crate::frame::{RequestPayload, StreamFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    AwaitingFirstFrame,
    Streaming,
    Completed,
    Failed
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::AwaitingFirstFrame => "awaiting_first_frame",
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Failed => "failed"
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions the driver must perform on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Send the serialized request payload. Issued exactly once.
    SendPayload(String),
    CloseConnection
}

pub struct SessionProtocol {
    session_uid: String,
    state: SessionState,
    payload: RequestPayload,
    aggregator: ResponseAggregator,
    sid: Option<String>,
    frames: usize,
    outcome: Option<Result<GuideAnswer, DialogueError>>,
    observers: Vec<Arc<dyn SessionObserver>>
}

impl SessionProtocol {
    pub fn new(payload: RequestPayload) -> Self {
        Self {
            session_uid: payload.session_uid().to_string(),
            state: SessionState::Idle,
            payload,
            aggregator: ResponseAggregator::new(),
            sid: None,
            frames: 0,
            outcome: None,
            observers: Vec::new()
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_observers(mut self, observers: impl IntoIterator<Item = Arc<dyn SessionObserver>>) -> Self {
        self.observers.extend(observers);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_uid(&self) -> &str {
        &self.session_uid
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn frames_received(&self) -> usize {
        self.frames
    }

    /// `Idle -> Connecting`. Returns false if the session already started.
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.transition(SessionState::Connecting);
        true
    }

    pub fn handle(&mut self, event: ConnectionEvent) -> Option<Directive> {
        if self.is_terminal() {
            trace!(session_uid = %self.session_uid, state = %self.state, ?event, "Ignoring event after terminal state");
            return None;
        }

        match event {
            ConnectionEvent::Ready => self.on_ready(),
            ConnectionEvent::Frame(frame) => self.on_frame(frame),
            ConnectionEvent::Error(error) => self.fail(error),
            ConnectionEvent::Closed => self.fail(DialogueError::transport(
                "connection closed before the final frame"
            ))
        }
    }

    /// Forces `Failed(Cancelled)` from any non-terminal state. A no-op on a
    /// terminal session.
    pub fn cancel(&mut self) -> Option<Directive> {
        if self.is_terminal() {
            return None;
        }
        self.fail(DialogueError::Cancelled)
    }

    /// The single outcome, available once the session is terminal.
    pub fn take_outcome(&mut self) -> Option<Result<GuideAnswer, DialogueError>> {
        self.outcome.take()
    }

    fn on_ready(&mut self) -> Option<Directive> {
        if self.state != SessionState::Connecting {
            trace!(session_uid = %self.session_uid, state = %self.state, "Duplicate ready ignored");
            return None;
        }

        match self.payload.to_json() {
            Ok(json) => {
                self.transition(SessionState::AwaitingFirstFrame);
                Some(Directive::SendPayload(json))
            }
            Err(e) => self.fail(e)
        }
    }

    fn on_frame(&mut self, frame: StreamFrame) -> Option<Directive> {
        self.frames += 1;
        if frame.sid.is_some() {
            self.sid.clone_from(&frame.sid);
        }

        if frame.is_rejection() {
            return self.fail(frame.into_rejection());
        }

        if !matches!(self.state, SessionState::AwaitingFirstFrame | SessionState::Streaming) {
            return self.fail(DialogueError::malformed(format!(
                "frame received while {}",
                self.state
            )));
        }

        let sequence = self.aggregator.append(&frame.content);
        self.notify(SessionEvent::ChunkReceived {
            session_uid: self.session_uid.clone(),
            sequence,
            chunk: frame.content.clone()
        });

        if frame.is_final() {
            return self.complete();
        }

        if self.state == SessionState::AwaitingFirstFrame {
            self.transition(SessionState::Streaming);
        }
        None
    }

    fn complete(&mut self) -> Option<Directive> {
        let full_text = std::mem::take(&mut self.aggregator).finish();
        self.transition(SessionState::Completed);
        self.notify(SessionEvent::Completed {
            session_uid: self.session_uid.clone(),
            full_text: full_text.clone()
        });
        self.outcome = Some(Ok(GuideAnswer {
            full_text,
            session_uid: self.session_uid.clone(),
            sid: self.sid.clone(),
            frames: self.frames
        }));
        Some(Directive::CloseConnection)
    }

    fn fail(&mut self, error: DialogueError) -> Option<Directive> {
        self.aggregator.discard();
        self.transition(SessionState::Failed);
        self.notify(SessionEvent::Failed {
            session_uid: self.session_uid.clone(),
            error_kind: error.kind(),
            error_message: error.to_string()
        });
        self.outcome = Some(Err(error));
        Some(Directive::CloseConnection)
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        self.notify(SessionEvent::StateChanged {
            session_uid: self.session_uid.clone(),
            from,
            to
        });
    }

    fn notify(&self, event: SessionEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}
