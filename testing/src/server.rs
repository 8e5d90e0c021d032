use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the server saw for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Request target of the upgrade, including the query string
    pub uri: String,
    /// First text message sent by the client
    pub payload: Option<String>
}

impl RecordedRequest {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        url::Url::parse(&format!("ws://localhost{}", self.uri))
            .map(|url| url.query_pairs().into_owned().collect())
            .unwrap_or_default()
    }

    pub fn payload_json(&self) -> Option<serde_json::Value> {
        self.payload
            .as_deref()
            .and_then(|p| serde_json::from_str(p).ok())
    }
}

#[derive(Debug, Clone)]
struct Behavior {
    frames: Vec<String>,
    close_after_frames: bool
}

/// A WebSocket server on an ephemeral loopback port.
///
/// Every connection is answered with the same frames once the client's
/// first text message arrives.
pub struct ScriptedWsServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>
}

impl ScriptedWsServer {
    /// Replays `frames`, then waits for the client to close.
    pub async fn start(frames: Vec<String>) -> anyhow::Result<Self> {
        Self::spawn(Behavior {
            frames,
            close_after_frames: false
        })
        .await
    }

    /// Replays `frames`, then closes the connection from the server side.
    pub async fn start_closing(frames: Vec<String>) -> anyhow::Result<Self> {
        Self::spawn(Behavior {
            frames,
            close_after_frames: true
        })
        .await
    }

    async fn spawn(behavior: Behavior) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        let recorded = recorded.clone();
                        let behavior = behavior.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, behavior, recorded).await {
                                tracing::warn!("Connection from {peer_addr} error: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!("Accept error: {e}");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            addr,
            requests,
            task
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `host:port` as used in the signed endpoint.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for ScriptedWsServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    behavior: Behavior,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>
) -> anyhow::Result<()> {
    let mut uri = String::new();
    let ws_stream = accept_hdr_async(stream, |request: &Request, response: Response| {
        uri = request.uri().to_string();
        Ok::<Response, ErrorResponse>(response)
    })
    .await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let first = tokio::time::timeout(Duration::from_secs(10), ws_receiver.next()).await;
    let payload = match first {
        Ok(Some(Ok(Message::Text(text)))) => Some(text.as_str().to_owned()),
        _ => None
    };
    let got_payload = payload.is_some();
    recorded.lock().push(RecordedRequest { uri, payload });

    if !got_payload {
        return Ok(());
    }

    for frame in behavior.frames {
        ws_sender.send(Message::Text(frame.into())).await?;
    }

    if behavior.close_after_frames {
        ws_sender.send(Message::Close(None)).await?;
    }

    while let Some(message) = ws_receiver.next().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    Ok(())
}
