//! Client WebSocket transport.
//!
//! Dials the remote target's debugger WebSocket endpoint (the URL exposed
//! at `http://host:9222/json` for a page, or `/json/version` for the
//! browser endpoint) and carries protocol frames as text messages.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::Transport;

// ============================================================================
// WebSocketTransport
// ============================================================================

/// A [`Transport`] over a client WebSocket connection.
///
/// Binary, ping and pong messages are ignored; the protocol is text-only.
#[derive(Debug)]
pub struct WebSocketTransport {
    /// Underlying WebSocket stream.
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketTransport {
    /// Dials a debugger WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the URL is not a valid `ws`/`wss` endpoint
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| Error::connect(format!("invalid endpoint {endpoint}: {e}")))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::connect(format!(
                "unsupported scheme {}: expected ws or wss",
                url.scheme()
            )));
        }

        let (stream, _) = connect_async(url.as_str()).await?;

        debug!(%url, "WebSocket connection established");

        Ok(Self { stream })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn next(&mut self) -> Result<Option<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),

                Some(Ok(Message::Close(_))) => {
                    debug!("WebSocket closed by remote");
                    return Ok(None);
                }

                // Ignore Binary, Ping, Pong, Frame
                Some(Ok(_)) => {}

                Some(Err(e)) => return Err(Error::WebSocket(e)),

                None => {
                    debug!("WebSocket stream ended");
                    return Ok(None);
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(Error::WebSocket(e)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_non_ws_scheme() {
        let err = WebSocketTransport::connect("http://127.0.0.1:9222/json")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let err = WebSocketTransport::connect("not a url").await.unwrap_err();
        assert!(matches!(err, Error::Connect { .. }));
    }
}
