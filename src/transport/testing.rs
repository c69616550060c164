//! In-memory transport for driving the runtime from tests.

use async_trait::async_trait;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::error::{Error, Result};

use super::Transport;

/// Transport half handed to the connection under test.
pub(crate) struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Remote half held by the test, playing the debugging target.
pub(crate) struct RemoteHandle {
    to_client: Option<mpsc::UnboundedSender<String>>,
    from_client: mpsc::UnboundedReceiver<String>,
}

/// Creates a connected transport/remote pair.
pub(crate) fn pair() -> (ChannelTransport, RemoteHandle) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();

    (
        ChannelTransport { inbound, outbound },
        RemoteHandle {
            to_client: Some(to_client),
            from_client,
        },
    )
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.outbound.send(text).map_err(|_| Error::TransportClosed)
    }

    async fn next(&mut self) -> Result<Option<String>> {
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<()> {
        self.inbound.close();
        Ok(())
    }
}

impl RemoteHandle {
    /// Pushes raw text at the client.
    pub(crate) fn push(&self, text: impl Into<String>) {
        self.to_client
            .as_ref()
            .expect("remote already disconnected")
            .send(text.into())
            .expect("client transport gone");
    }

    /// Pushes a success response for the given call id.
    pub(crate) fn respond_success(&self, id: u64, result: Value) {
        self.push(json!({ "id": id, "result": result }).to_string());
    }

    /// Pushes an error response for the given call id.
    pub(crate) fn respond_error(&self, id: u64, code: i64, message: &str) {
        self.push(json!({ "id": id, "error": { "code": code, "message": message } }).to_string());
    }

    /// Pushes an unsolicited event.
    pub(crate) fn emit(&self, method: &str, params: Value) {
        self.push(json!({ "method": method, "params": params }).to_string());
    }

    /// Receives the next outbound call, parsed to `(id, method, params)`.
    pub(crate) async fn next_call(&mut self) -> Option<(u64, String, Value)> {
        let text = self.from_client.recv().await?;
        let value: Value = serde_json::from_str(&text).expect("outbound frame is JSON");
        Some((
            value["id"].as_u64().expect("outbound frame has id"),
            value["method"].as_str().expect("outbound frame has method").to_owned(),
            value.get("params").cloned().unwrap_or(Value::Null),
        ))
    }

    /// Simulates the remote end dropping the connection.
    pub(crate) fn disconnect(&mut self) {
        self.to_client = None;
    }
}
