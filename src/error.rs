//! Error types for the DevTools protocol client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use chrome_devtools_client::{Connection, Result};
//!
//! async fn example(connection: &Connection) -> Result<()> {
//!     connection.ensure_activated("Network", &[]).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Connection | [`Error::Connect`], [`Error::TransportClosed`] |
//! | Wire | [`Error::MalformedFrame`], [`Error::UnmatchedResponse`] |
//! | Call | [`Error::Remote`], [`Error::Decode`], [`Error::RequestTimeout`] |
//! | Activation | [`Error::CyclicDependency`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |
//!
//! Only [`Error::TransportClosed`] is fatal to a connection. Everything
//! else is scoped to a single call, event, or activation walk.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::CallId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection could not be established.
    ///
    /// Returned when dialing the debugger endpoint fails.
    #[error("Connection failed: {message}")]
    Connect {
        /// Description of the connection error.
        message: String,
    },

    /// The underlying transport is gone.
    ///
    /// Returned for every call pending at closure time and for every call
    /// issued afterwards. Fatal for the connection; create a new one to
    /// retry.
    #[error("Transport closed")]
    TransportClosed,

    // ========================================================================
    // Wire Errors
    // ========================================================================
    /// An inbound frame could not be decoded.
    ///
    /// The frame is discarded and the connection continues.
    #[error("Malformed frame: {reason}")]
    MalformedFrame {
        /// Why the frame was rejected.
        reason: String,
    },

    /// A response arrived for an id with no pending call.
    ///
    /// Logged and discarded by the reader loop; other pending calls are
    /// unaffected.
    #[error("Unmatched response for call {id}")]
    UnmatchedResponse {
        /// The unknown correlation id.
        id: CallId,
    },

    // ========================================================================
    // Call Errors
    // ========================================================================
    /// The remote end rejected a call.
    ///
    /// Surfaced to the caller of that specific call only.
    #[error("Remote error {code}: {message}")]
    Remote {
        /// Protocol error code.
        code: i64,
        /// Human-readable error message.
        message: String,
        /// Optional error payload.
        data: Option<Value>,
    },

    /// A structurally valid payload did not match the expected shape.
    ///
    /// Surfaced to the caller or subscriber that asked for the shape;
    /// never fatal to the connection.
    #[error("Decode failed for {context}: {source}")]
    Decode {
        /// Method or event name the payload belonged to.
        context: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// A call did not complete within the caller-supplied deadline.
    ///
    /// Returned by [`Connection::request_with_timeout`] only; the core
    /// itself never times calls out.
    ///
    /// [`Connection::request_with_timeout`]: crate::Connection::request_with_timeout
    #[error("Request {method} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Method of the timed-out call.
        method: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // Activation Errors
    // ========================================================================
    /// The domain dependency graph contains a cycle.
    ///
    /// Detected before any activation call is issued.
    #[error("Cyclic domain dependency involving {domain}")]
    CyclicDependency {
        /// A domain on the cycle.
        domain: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a connect error.
    #[inline]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a malformed-frame error.
    #[inline]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFrame {
            reason: reason.into(),
        }
    }

    /// Creates an unmatched-response error.
    #[inline]
    pub fn unmatched(id: CallId) -> Self {
        Self::UnmatchedResponse { id }
    }

    /// Creates a remote error.
    #[inline]
    pub fn remote(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
            data,
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(method: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            method: method.into(),
            timeout_ms,
        }
    }

    /// Creates a cyclic-dependency error.
    #[inline]
    pub fn cyclic(domain: impl Into<String>) -> Self {
        Self::CyclicDependency {
            domain: domain.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error means the connection is gone.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::TransportClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the remote end explicitly rejected a call.
    #[inline]
    #[must_use]
    pub fn is_remote_error(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns `true` if this is a wire-level anomaly the connection
    /// survives.
    #[inline]
    #[must_use]
    pub fn is_wire_anomaly(&self) -> bool {
        matches!(
            self,
            Self::MalformedFrame { .. } | Self::UnmatchedResponse { .. }
        )
    }

    /// Returns `true` if this error is recoverable by retrying the same
    /// operation on the same connection.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connect("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::remote(-32000, "Target closed", None);
        assert_eq!(err.to_string(), "Remote error -32000: Target closed");
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::TransportClosed.is_connection_error());
        assert!(Error::connect("x").is_connection_error());
        assert!(!Error::malformed("x").is_connection_error());
    }

    #[test]
    fn test_is_wire_anomaly() {
        assert!(Error::malformed("not json").is_wire_anomaly());
        assert!(Error::unmatched(CallId::new(7)).is_wire_anomaly());
        assert!(!Error::TransportClosed.is_wire_anomaly());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::request_timeout("Page.navigate", 1000).is_recoverable());
        assert!(!Error::TransportClosed.is_recoverable());
        assert!(!Error::cyclic("Page").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
