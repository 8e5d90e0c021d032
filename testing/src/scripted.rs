use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dialogue::{Connection, Connector, Inbound};
use errors::DialogueError;
use parking_lot::Mutex;
use url::Url;

use crate::frames::stream_frames;

/// How the connect step of an attempt behaves.
#[derive(Debug, Clone)]
pub enum ConnectBehavior {
    Immediate,
    After(Duration),
    /// Never becomes ready
    Never,
    Refuse(String)
}

/// One inbound step, replayed after the payload has been sent.
#[derive(Debug, Clone)]
pub enum Step {
    Frame(String),
    Delay(Duration),
    /// Remote closes the connection
    Close,
    Error(DialogueError),
    /// Stays open without sending anything else
    Hang
}

/// The behaviour of one connection attempt.
#[derive(Debug, Clone)]
pub struct Script {
    connect: ConnectBehavior,
    steps: Vec<Step>
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl Script {
    pub fn new() -> Self {
        Self {
            connect: ConnectBehavior::Immediate,
            steps: Vec::new()
        }
    }

    /// Progress frames for every chunk and a final frame for the last one.
    pub fn streaming(chunks: &[&str]) -> Self {
        stream_frames(chunks)
            .into_iter()
            .fold(Self::new(), |script, frame| script.frame(frame))
    }

    pub fn never_ready() -> Self {
        Self::new().connect(ConnectBehavior::Never)
    }

    pub fn refused(reason: &str) -> Self {
        Self::new().connect(ConnectBehavior::Refuse(reason.to_string()))
    }

    pub fn connect(mut self, behavior: ConnectBehavior) -> Self {
        self.connect = behavior;
        self
    }

    pub fn frame(mut self, frame: impl Into<String>) -> Self {
        self.steps.push(Step::Frame(frame.into()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.steps.push(Step::Delay(delay));
        self
    }

    pub fn close(mut self) -> Self {
        self.steps.push(Step::Close);
        self
    }

    pub fn error(mut self, error: DialogueError) -> Self {
        self.steps.push(Step::Error(error));
        self
    }

    pub fn hang(mut self) -> Self {
        self.steps.push(Step::Hang);
        self
    }
}

/// Counters shared by a connector and every connection it opened.
#[derive(Debug, Default)]
pub struct ScriptStats {
    connects: AtomicUsize,
    closes: AtomicUsize,
    open: AtomicUsize,
    urls: Mutex<Vec<Url>>,
    payloads: Mutex<Vec<String>>
}

impl ScriptStats {
    /// Connect attempts, including refused and pending ones.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Calls to `Connection::close`.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Connections (or pending connects) not yet released.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<Url> {
        self.urls.lock().clone()
    }

    /// Every text frame sent, in order.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().clone()
    }

    /// Sent payloads parsed as JSON.
    pub fn payload_json(&self) -> Vec<serde_json::Value> {
        self.payloads
            .lock()
            .iter()
            .filter_map(|p| serde_json::from_str(p).ok())
            .collect()
    }
}

/// Decrements the open counter when a connection or pending connect is
/// dropped.
struct OpenGuard(Arc<ScriptStats>);

impl OpenGuard {
    fn new(stats: Arc<ScriptStats>) -> Self {
        stats.open.fetch_add(1, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A connector that replays one [`Script`] per connect attempt.
pub struct ScriptedConnector {
    scripts: Mutex<VecDeque<Script>>,
    stats: Arc<ScriptStats>
}

impl ScriptedConnector {
    pub fn new(script: Script) -> Arc<Self> {
        Self::with_scripts(vec![script])
    }

    pub fn with_scripts(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            stats: Arc::new(ScriptStats::default())
        })
    }

    pub fn stats(&self) -> Arc<ScriptStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>, DialogueError> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        self.stats.urls.lock().push(url.clone());

        let script = self
            .scripts
            .lock()
            .pop_front()
            .ok_or_else(|| DialogueError::transport("no script left for this attempt"))?;

        let guard = OpenGuard::new(self.stats.clone());
        match script.connect {
            ConnectBehavior::Immediate => {}
            ConnectBehavior::After(delay) => tokio::time::sleep(delay).await,
            ConnectBehavior::Never => std::future::pending::<()>().await,
            ConnectBehavior::Refuse(reason) => return Err(DialogueError::transport(reason))
        }

        Ok(Box::new(ScriptedConnection {
            steps: script.steps.into(),
            payload_sent: false,
            closed: false,
            stats: self.stats.clone(),
            _guard: guard
        }))
    }
}

struct ScriptedConnection {
    steps: VecDeque<Step>,
    payload_sent: bool,
    closed: bool,
    stats: Arc<ScriptStats>,
    _guard: OpenGuard
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send_text(&mut self, text: String) -> Result<(), DialogueError> {
        if self.closed {
            return Err(DialogueError::transport("send on closed connection"));
        }
        self.stats.payloads.lock().push(text);
        self.payload_sent = true;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Inbound, DialogueError> {
        if !self.payload_sent || self.closed {
            return std::future::pending().await;
        }

        loop {
            match self.steps.front().cloned() {
                Some(Step::Frame(frame)) => {
                    self.steps.pop_front();
                    return Ok(Inbound::Text(frame));
                }
                Some(Step::Delay(delay)) => {
                    tokio::time::sleep(delay).await;
                    self.steps.pop_front();
                }
                Some(Step::Close) => {
                    self.steps.pop_front();
                    return Ok(Inbound::Closed);
                }
                Some(Step::Error(error)) => {
                    self.steps.pop_front();
                    return Err(error);
                }
                Some(Step::Hang) | None => return std::future::pending().await
            }
        }
    }

    async fn close(&mut self) -> Result<(), DialogueError> {
        self.closed = true;
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
