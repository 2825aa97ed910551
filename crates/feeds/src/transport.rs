//! Text-frame transports.
//!
//! A [`Transport`] is one bidirectional text channel. [`WsTransport`] talks to
//! a real endpoint; [`MemoryTransport`] is an in-process pair used for fixture
//! replay and tests.

use crate::SessionError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use url::Url;

/// A bidirectional text-message connection.
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), SessionError>;

    /// Wait for the next text frame.
    ///
    /// Only text is surfaced. End of stream or a close from the peer is a
    /// `Connection` error. Must be cancel safe: callers bound it with a timeout.
    async fn next_text(&mut self) -> Result<String, SessionError>;

    /// Release the connection. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// WebSocket transport over tokio-tungstenite.
pub struct WsTransport {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    /// Connect and complete the WebSocket handshake.
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let parsed = Url::parse(url)?;
        debug!("Connecting to {}", parsed);

        let (stream, response) = connect_async(parsed.as_str()).await?;
        debug!("Connected to {} (status: {:?})", parsed, response.status());

        Ok(Self {
            url: parsed.to_string(),
            stream,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Result<String, SessionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Ping(data))) => {
                    debug!("{}: Received WebSocket PING, sending PONG", self.url);
                    self.stream.send(Message::Pong(data)).await?;
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Binary(data))) => {
                    warn!("{}: Ignoring binary frame ({} bytes)", self.url, data.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("{}: Received close frame: {:?}", self.url, frame);
                    return Err(SessionError::Connection(format!(
                        "closed by peer: {:?}",
                        frame
                    )));
                }
                Some(Ok(Message::Frame(_))) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Err(SessionError::Connection("stream ended".to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match self.stream.close(None).await {
            Ok(()) | Err(WsError::AlreadyClosed) | Err(WsError::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Client half of an in-memory connection.
pub struct MemoryTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    closed: bool,
    // Keeps a replayed stream open after the recorded frames run out.
    _replay_peer: Option<MemoryPeer>,
}

/// Remote half of an in-memory connection.
pub struct MemoryPeer {
    to_client: mpsc::UnboundedSender<String>,
    from_client: mpsc::UnboundedReceiver<String>,
}

/// Create a connected transport/peer pair.
pub fn memory_pair() -> (MemoryTransport, MemoryPeer) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    (
        MemoryTransport {
            inbound,
            outbound,
            closed: false,
            _replay_peer: None,
        },
        MemoryPeer {
            to_client,
            from_client,
        },
    )
}

impl MemoryTransport {
    /// A transport that yields `frames` in order, then stays open and silent.
    /// Outbound frames are accepted and discarded.
    pub fn replay<I>(frames: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let (mut transport, peer) = memory_pair();
        for frame in frames {
            // The receiver is alive, so this cannot fail.
            let _ = peer.to_client.send(frame.into());
        }
        transport._replay_peer = Some(peer);
        transport
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Connection("transport closed".to_string()));
        }
        self.outbound
            .send(text)
            .map_err(|_| SessionError::Connection("peer disconnected".to_string()))
    }

    async fn next_text(&mut self) -> Result<String, SessionError> {
        if self.closed {
            return Err(SessionError::Connection("transport closed".to_string()));
        }
        self.inbound
            .recv()
            .await
            .ok_or_else(|| SessionError::Connection("stream ended".to_string()))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.closed = true;
        self.inbound.close();
        Ok(())
    }
}

impl MemoryPeer {
    /// Deliver a raw text frame to the client.
    pub fn push(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.to_client
            .send(text.into())
            .map_err(|_| SessionError::Connection("client disconnected".to_string()))
    }

    /// Deliver a JSON message to the client.
    pub fn push_json(&self, value: &serde_json::Value) -> Result<(), SessionError> {
        self.push(value.to_string())
    }

    /// Wait for the next frame sent by the client. `None` once the client is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame sent by the client, decoded as JSON.
    pub async fn recv_json(&mut self) -> Option<serde_json::Value> {
        let text = self.recv().await?;
        serde_json::from_str(&text).ok()
    }

    /// Frame sent by the client, if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_pair_round_trip() {
        let (mut transport, mut peer) = memory_pair();

        transport.send_text("hello".to_string()).await.unwrap();
        assert_eq!(peer.recv().await.as_deref(), Some("hello"));

        peer.push_json(&json!({"channel": "heartbeat"})).unwrap();
        assert_eq!(transport.next_text().await.unwrap(), r#"{"channel":"heartbeat"}"#);
    }

    #[tokio::test]
    async fn test_memory_peer_drop_ends_stream() {
        let (mut transport, peer) = memory_pair();
        peer.push("last").unwrap();
        drop(peer);

        assert_eq!(transport.next_text().await.unwrap(), "last");
        assert!(matches!(
            transport.next_text().await,
            Err(SessionError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_close_is_idempotent() {
        let (mut transport, _peer) = memory_pair();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
        assert!(transport.send_text("x".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_replay_stays_open_after_frames() {
        let mut transport = MemoryTransport::replay(vec!["a", "b"]);
        transport.send_text("ignored".to_string()).await.unwrap();
        assert_eq!(transport.next_text().await.unwrap(), "a");
        assert_eq!(transport.next_text().await.unwrap(), "b");

        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            transport.next_text(),
        )
        .await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_ws_connect_invalid_url() {
        let result = WsTransport::connect("not a url").await;
        assert!(matches!(result, Err(SessionError::Connection(_))));
    }
}
