//! # Dialogue Sessions
//!
//! Signed streaming dialogue sessions against the Spark chat service.
//!
//! A session signs a fresh endpoint, opens one WebSocket, sends one request
//! payload, concatenates the streamed chunks and resolves to a single
//! outcome: the full answer or one classified [`errors::DialogueError`].
//!
//! - [`signature`]: HMAC-SHA256 request signing and endpoint URLs
//! - [`prompt`] / [`languages`]: payload construction per target language
//! - [`connection`] / [`websocket`]: connection lifecycle and transport
//! - [`protocol`] / [`aggregator`]: the session state machine
//! - [`session`]: the client, session handles and cancellation
//! - [`retry`]: optional caller-side retries

pub mod aggregator;
pub mod answer;
pub mod connection;
pub mod events;
pub mod frame;
pub mod languages;
pub mod prompt;
pub mod protocol;
pub mod retry;
pub mod session;
pub mod signature;
pub mod websocket;

pub use aggregator::ResponseAggregator;
pub use answer::{GuideAnswer, GuideSection, SessionOutcome};
pub use connection::{
    Connection, ConnectionEvent, ConnectionHandle, ConnectionManager, Connector, Inbound,
};
pub use events::{ChannelObserver, NoopObserver, SessionEvent, SessionObserver, TracingObserver};
pub use frame::{ChatMessage, RequestPayload, StreamFrame, StreamStatus};
pub use languages::Language;
pub use prompt::{PromptBuilder, PromptTask};
pub use protocol::{Directive, SessionProtocol, SessionState};
pub use retry::request_with_retry;
pub use session::{CancelSignal, DialogueClient, DialogueRequest, SessionCanceller, SessionHandle};
pub use signature::{ConnectionEndpoint, SignedAuthorization, SigningContext, sign};
pub use websocket::WebSocketConnector;
