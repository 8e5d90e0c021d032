//! Connection Manager.
//!
//! Owns one duplex connection per session. The connection lives in its own
//! task; the session talks to it through a [`ConnectionHandle`] that sends
//! commands and receives [`ConnectionEvent`]s in transport order.
//!
//! Guarantees per connection:
//! - `Ready` is emitted at most once, and only if the connect finished within
//!   the timeout budget. The timer is dropped as soon as the connect
//!   resolves.
//! - `Closed` is emitted exactly once and is always the last event.
//! - The underlying [`Connection::close`] is called at most once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use errors::DialogueError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use url::Url;

use crate::frame::StreamFrame;
use crate::signature::ConnectionEndpoint;

/// Raw inbound data from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    /// A data frame the transport could not decode; the connection stays open
    Malformed(String),
    /// The remote side ended the connection
    Closed
}

/// An open duplex connection.
#[async_trait]
pub trait Connection: Send {
    async fn send_text(&mut self, text: String) -> Result<(), DialogueError>;

    /// Waits for the next inbound message. Must be cancel-safe.
    async fn recv(&mut self) -> Result<Inbound, DialogueError>;

    async fn close(&mut self) -> Result<(), DialogueError>;
}

/// Opens connections to signed endpoints.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>, DialogueError>;
}

/// Lifecycle events routed to the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Ready,
    Frame(StreamFrame),
    Error(DialogueError),
    Closed
}

#[derive(Debug)]
enum Command {
    Send(String),
    Close
}

/// Opens connections with a fixed connect budget.
#[derive(Clone)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    connect_timeout: Duration
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, connect_timeout: Duration) -> Self {
        Self {
            connector,
            connect_timeout
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Starts connecting to `endpoint` and returns immediately.
    pub fn open(&self, endpoint: &ConnectionEndpoint) -> ConnectionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        debug!(endpoint = %endpoint.redacted(), "Opening connection");

        let task = tokio::spawn(run_connection(
            self.connector.clone(),
            endpoint.url().clone(),
            self.connect_timeout,
            command_rx,
            event_tx
        ));

        ConnectionHandle {
            commands: command_tx,
            events: event_rx,
            task: Some(task),
            finished: false
        }
    }
}

async fn run_connection(
    connector: Arc<dyn Connector>,
    url: Url,
    connect_timeout: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ConnectionEvent>
) {
    let emit = |event: ConnectionEvent| {
        if events.send(event).is_err() {
            trace!("Connection event receiver dropped");
        }
    };

    let connect = tokio::time::timeout(connect_timeout, connector.connect(&url));
    let mut connection = tokio::select! {
        biased;
        _ = commands.recv() => {
            debug!("Connection closed before it became ready");
            emit(ConnectionEvent::Closed);
            return;
        }
        result = connect => match result {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => {
                warn!(error = %e, "Connect failed");
                emit(ConnectionEvent::Error(e));
                emit(ConnectionEvent::Closed);
                return;
            }
            Err(_elapsed) => {
                let timeout_ms = duration_ms(connect_timeout);
                warn!(timeout_ms, "Connection not ready within budget");
                emit(ConnectionEvent::Error(DialogueError::ConnectionTimeout { timeout_ms }));
                emit(ConnectionEvent::Closed);
                return;
            }
        }
    };

    emit(ConnectionEvent::Ready);

    loop {
        tokio::select! {
            biased;
            command = commands.recv() => match command {
                Some(Command::Send(text)) => {
                    trace!(bytes = text.len(), "Sending text frame");
                    if let Err(e) = connection.send_text(text).await {
                        emit(ConnectionEvent::Error(e));
                        break;
                    }
                }
                Some(Command::Close) | None => break
            },
            inbound = connection.recv() => match inbound {
                Ok(Inbound::Text(raw)) => match StreamFrame::parse(&raw) {
                    Ok(frame) => emit(ConnectionEvent::Frame(frame)),
                    Err(e) => {
                        debug!(error = %e, "Dropping malformed frame");
                        emit(ConnectionEvent::Error(e));
                    }
                },
                Ok(Inbound::Malformed(reason)) => {
                    debug!(%reason, "Dropping undecodable frame");
                    emit(ConnectionEvent::Error(DialogueError::malformed(reason)));
                }
                Ok(Inbound::Closed) => {
                    debug!("Connection closed by remote");
                    break;
                }
                Err(e) => {
                    emit(ConnectionEvent::Error(e));
                    break;
                }
            }
        }
    }

    if let Err(e) = connection.close().await {
        debug!(error = %e, "Error while closing connection");
    }
    emit(ConnectionEvent::Closed);
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Session-side end of one connection.
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,
    task: Option<JoinHandle<()>>,
    finished: bool
}

impl ConnectionHandle {
    /// Queues a text frame for sending.
    pub fn send(&self, text: String) -> Result<(), DialogueError> {
        self.commands
            .send(Command::Send(text))
            .map_err(|_e| DialogueError::transport("connection is no longer open"))
    }

    /// Next lifecycle event. Returns `None` once `Closed` has been delivered.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await;
        if matches!(event, Some(ConnectionEvent::Closed) | None) {
            self.finished = true;
        }
        event
    }

    /// Closes the connection and waits until the transport is released.
    /// Calling it again is a no-op.
    pub async fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = self.commands.send(Command::Close);
        if let Err(e) = task.await {
            warn!(error = %e, "Connection task ended abnormally");
        }
    }

    pub fn is_released(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
