//! Session orchestration.
//!
//! A [`DialogueClient`] starts sessions. Each session runs in its own task:
//! it signs a fresh endpoint, opens one connection, feeds connection events
//! through the [`SessionProtocol`], and resolves to a single outcome. Sessions
//! share nothing mutable, so any number may run concurrently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use config::{Credentials, DialogueConfig, EndpointConfig};
use errors::DialogueError;
use metrics::{counter, histogram};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::answer::GuideAnswer;
use crate::connection::{ConnectionEvent, ConnectionManager, Connector, duration_ms};
use crate::events::SessionObserver;
use crate::prompt::{PromptBuilder, PromptTask, new_session_uid};
use crate::protocol::{Directive, SessionProtocol};
use crate::signature::{ConnectionEndpoint, SigningContext, signed_endpoint};
use crate::websocket::WebSocketConnector;

/// One guide or translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueRequest {
    pub task: PromptTask,
    pub source_text: String,
    /// Target language code; blank means the configured default
    pub language_code: String
}

impl DialogueRequest {
    pub fn guide(source_text: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            task: PromptTask::Guide,
            source_text: source_text.into(),
            language_code: language_code.into()
        }
    }

    pub fn translate(source_text: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            task: PromptTask::Translate,
            source_text: source_text.into(),
            language_code: language_code.into()
        }
    }
}

/// Caller-side cancellation trigger. Clones share one signal, so a single
/// signal can cover a whole retry sequence.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    sender: Arc<watch::Sender<bool>>
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender)
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`CancelSignal::cancel`] has been called.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Cancels one session and waits for its connection to be released.
///
/// Holds a signal owned by that session alone; sibling sessions started
/// with the same caller [`CancelSignal`] are unaffected.
#[derive(Debug, Clone)]
pub struct SessionCanceller {
    signal: CancelSignal,
    released: watch::Receiver<bool>
}

impl SessionCanceller {
    /// Idempotent. Returns once the session's connection has been closed;
    /// on an already finished session it returns immediately.
    pub async fn cancel(&self) {
        self.signal.cancel();
        let mut released = self.released.clone();
        let _ = released.wait_for(|released| *released).await;
    }

    pub fn is_released(&self) -> bool {
        *self.released.borrow()
    }
}

/// A running session. Dropping the handle detaches the session; it still
/// runs to its terminal state and releases its connection.
pub struct SessionHandle {
    session_uid: String,
    canceller: SessionCanceller,
    task: JoinHandle<Result<GuideAnswer, DialogueError>>
}

impl SessionHandle {
    pub fn session_uid(&self) -> &str {
        &self.session_uid
    }

    pub fn canceller(&self) -> SessionCanceller {
        self.canceller.clone()
    }

    pub async fn cancel(&self) {
        self.canceller.cancel().await;
    }

    /// Waits for the terminal outcome.
    pub async fn outcome(self) -> Result<GuideAnswer, DialogueError> {
        self.task
            .await
            .map_err(|e| DialogueError::transport(format!("session task failed: {e}")))?
    }
}

/// Entry point for guide and translation sessions.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Holds resolved credentials, endpoint and generation settings, and starts
/// one independent session per request. Every session signs a brand-new
/// endpoint; signatures are never reused.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
/// use dialogue::{CancelSignal, DialogueClient};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DialogueClient::from_config(&load_from_env()?)?;
/// let answer = client
///     .request_guide("学而时习之，不亦说乎", "en", &CancelSignal::new())
///     .await?;
/// for section in answer.sections() {
///     println!("{:?}: {}", section.heading, section.body);
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Error Handling
/// Missing credentials and blank source text are `Configuration` errors
/// raised before any signing or network activity. All other failures arrive
/// through the session outcome and are never retried by the session itself.
#[derive(Clone)]
pub struct DialogueClient {
    credentials: Arc<Credentials>,
    endpoint: EndpointConfig,
    prompt: PromptBuilder,
    manager: ConnectionManager,
    observers: Vec<Arc<dyn SessionObserver>>
}

impl DialogueClient {
    pub fn new(credentials: Credentials, config: &DialogueConfig) -> Self {
        let prompt = PromptBuilder::new(credentials.app_id(), &config.session);
        Self {
            credentials: Arc::new(credentials),
            endpoint: config.endpoint.clone(),
            prompt,
            manager: ConnectionManager::new(
                Arc::new(WebSocketConnector),
                Duration::from_millis(config.session.connect_timeout_ms)
            ),
            observers: Vec::new()
        }
    }

    /// Validates the configuration and resolves its credentials.
    pub fn from_config(config: &DialogueConfig) -> Result<Self, DialogueError> {
        config::validate(config)?;
        let credentials = config.credentials.resolve()?;
        Ok(Self::new(credentials, config))
    }

    /// Replaces the transport.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.manager = ConnectionManager::new(connector, self.manager.connect_timeout());
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt
    }

    /// Starts a session with its own cancellation signal.
    pub fn start(&self, request: DialogueRequest) -> Result<SessionHandle, DialogueError> {
        self.start_with_cancel(request, CancelSignal::new())
    }

    /// Starts a session that also ends when `cancel` fires.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_with_cancel(
        &self,
        request: DialogueRequest,
        cancel: CancelSignal
    ) -> Result<SessionHandle, DialogueError> {
        if request.source_text.trim().is_empty() {
            return Err(DialogueError::configuration("source text is empty"));
        }

        let session_uid = new_session_uid();
        let payload = self.prompt.build_payload(
            request.task,
            &request.source_text,
            &request.language_code,
            &session_uid
        );

        let context = SigningContext::now(&self.endpoint.host, &self.endpoint.path, &self.endpoint.method);
        let endpoint = signed_endpoint(&self.credentials, &self.endpoint.scheme, &context)?;

        let protocol = SessionProtocol::new(payload).with_observers(self.observers.iter().cloned());
        let (released_tx, released_rx) = watch::channel(false);
        let session_cancel = CancelSignal::new();

        info!(
            %session_uid,
            task = ?request.task,
            language = %request.language_code,
            "Starting dialogue session"
        );

        let task = tokio::spawn(drive_session(
            protocol,
            self.manager.clone(),
            endpoint,
            cancel,
            session_cancel.clone(),
            released_tx
        ));

        Ok(SessionHandle {
            session_uid,
            canceller: SessionCanceller {
                signal: session_cancel,
                released: released_rx
            },
            task
        })
    }

    /// Runs one request to completion.
    pub async fn request(
        &self,
        request: DialogueRequest,
        cancel: &CancelSignal
    ) -> Result<GuideAnswer, DialogueError> {
        if cancel.is_cancelled() {
            return Err(DialogueError::Cancelled);
        }
        self.start_with_cancel(request, cancel.clone())?.outcome().await
    }

    pub async fn request_guide(
        &self,
        source_text: &str,
        language_code: &str,
        cancel: &CancelSignal
    ) -> Result<GuideAnswer, DialogueError> {
        self.request(DialogueRequest::guide(source_text, language_code), cancel)
            .await
    }

    pub async fn request_translation(
        &self,
        source_text: &str,
        language_code: &str,
        cancel: &CancelSignal
    ) -> Result<GuideAnswer, DialogueError> {
        self.request(DialogueRequest::translate(source_text, language_code), cancel)
            .await
    }
}

async fn drive_session(
    mut protocol: SessionProtocol,
    manager: ConnectionManager,
    endpoint: ConnectionEndpoint,
    cancel: CancelSignal,
    session_cancel: CancelSignal,
    released: watch::Sender<bool>
) -> Result<GuideAnswer, DialogueError> {
    let started = Instant::now();
    counter!("dialogue_sessions_started_total").increment(1);

    protocol.start();
    let mut connection = manager.open(&endpoint);

    while !protocol.is_terminal() {
        let directive = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(session_uid = %protocol.session_uid(), "Cancellation requested by caller");
                protocol.cancel()
            }
            _ = session_cancel.cancelled() => {
                debug!(session_uid = %protocol.session_uid(), "Session cancelled through its handle");
                protocol.cancel()
            }
            event = connection.next_event() => match event {
                Some(event) => {
                    if matches!(event, ConnectionEvent::Frame(_)) {
                        counter!("dialogue_frames_received_total").increment(1);
                    }
                    protocol.handle(event)
                }
                None => protocol.handle(ConnectionEvent::Closed)
            }
        };

        if let Some(Directive::SendPayload(json)) = directive {
            if let Err(e) = connection.send(json) {
                protocol.handle(ConnectionEvent::Error(e));
            }
        }
    }

    connection.close().await;
    released.send_replace(true);

    let outcome = protocol
        .take_outcome()
        .unwrap_or_else(|| Err(DialogueError::transport("session ended without an outcome")));

    let label = match &outcome {
        Ok(_) => "completed",
        Err(e) => e.kind().as_str()
    };
    counter!("dialogue_sessions_finished_total", "outcome" => label).increment(1);
    histogram!("dialogue_session_duration_seconds").record(started.elapsed().as_secs_f64());

    match &outcome {
        Ok(answer) => info!(
            session_uid = %protocol.session_uid(),
            frames = answer.frames,
            bytes = answer.full_text.len(),
            elapsed_ms = duration_ms(started.elapsed()),
            "Dialogue session completed"
        ),
        Err(e) => warn!(
            session_uid = %protocol.session_uid(),
            error_kind = %e.kind(),
            error = %e,
            "Dialogue session failed"
        )
    }

    outcome
}
