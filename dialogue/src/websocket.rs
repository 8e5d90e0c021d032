//! WebSocket transport for the connection manager.

use async_trait::async_trait;
use errors::DialogueError;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::connection::{Connection, Connector, Inbound};

/// Connects with `tokio-tungstenite`, using TLS for `wss` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Connection>, DialogueError> {
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| DialogueError::transport(format!("WebSocket handshake failed: {e}")))?;

        debug!(status = %response.status(), "WebSocket connected");
        Ok(Box::new(WebSocketConnection {
            stream,
            closed: false
        }))
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send_text(&mut self, text: String) -> Result<(), DialogueError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| DialogueError::transport(format!("WebSocket send failed: {e}")))
    }

    async fn recv(&mut self) -> Result<Inbound, DialogueError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Inbound::Text(text.as_str().to_owned())),
                Some(Ok(Message::Binary(bytes))) => {
                    return Ok(match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => Inbound::Text(text),
                        Err(_e) => Inbound::Malformed("binary frame is not UTF-8".to_string())
                    });
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "WebSocket closed by server");
                    self.closed = true;
                    return Ok(Inbound::Closed);
                }
                Some(Ok(other)) => {
                    trace!(kind = message_kind(&other), "Ignoring control frame");
                }
                Some(Err(e)) => {
                    return Err(DialogueError::transport(format!("WebSocket receive failed: {e}")));
                }
                None => {
                    self.closed = true;
                    return Ok(Inbound::Closed);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), DialogueError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(DialogueError::transport(format!("WebSocket close failed: {e}")))
        }
    }
}

fn message_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[tokio::test]
    async fn test_non_utf8_binary_frame_is_not_fatal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(Message::Binary(vec![0xff, 0xfe, 0xfd].into())).await.unwrap();
            ws.send(Message::Text("after".to_string().into())).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if message.is_close() {
                    break;
                }
            }
        });

        let url = Url::parse(&format!("ws://{addr}/v1.1/chat")).unwrap();
        let mut connection = WebSocketConnector.connect(&url).await.unwrap();

        assert_eq!(
            connection.recv().await.unwrap(),
            Inbound::Malformed("binary frame is not UTF-8".to_string())
        );
        assert_eq!(connection.recv().await.unwrap(), Inbound::Text("after".to_string()));

        connection.close().await.unwrap();
        server.await.unwrap();
    }
}
