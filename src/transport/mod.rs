//! Message transport layer.
//!
//! This module owns the raw duplex text channel to the remote debugging
//! target. The [`Transport`] trait abstracts the channel so the runtime
//! can be driven by a real WebSocket or, in tests, an in-memory pair.
//!
//! # Contract
//!
//! - `send` fails once the channel is closed.
//! - `next` yields inbound text frames, `Ok(None)` on clean close, `Err`
//!   on I/O failure. Either terminal outcome is reported exactly once to
//!   the reader loop, which then fails all outstanding work.
//! - A dropped transport is terminal for its connection; there is no
//!   retry or reconnect here. Callers create a new connection to retry.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | Client WebSocket transport over tokio-tungstenite |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// Client WebSocket transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::WebSocketTransport;

// ============================================================================
// Transport
// ============================================================================

/// A duplex, message-oriented text channel to the remote target.
#[async_trait]
pub trait Transport: Send {
    /// Sends one outbound text frame.
    ///
    /// # Errors
    ///
    /// Fails if the channel is closed or the write fails; both are
    /// terminal for the connection.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Receives the next inbound text frame.
    ///
    /// Returns `Ok(None)` once the peer has closed the channel.
    ///
    /// # Errors
    ///
    /// Fails on transport-level I/O errors; terminal for the connection.
    async fn next(&mut self) -> Result<Option<String>>;

    /// Closes the channel.
    ///
    /// Idempotent; closing an already-closed channel is not an error.
    async fn close(&mut self) -> Result<()>;
}
