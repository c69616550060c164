//! Protocol frame types.
//!
//! Three frame shapes travel over a DevTools connection:
//!
//! | Frame | Direction | Shape |
//! |-------|-----------|-------|
//! | [`RequestFrame`] | Local → Remote | `{id, method, params}` |
//! | [`ResponseFrame`] | Remote → Local | `{id, result}` or `{id, error}` |
//! | [`EventFrame`] | Remote → Local | `{method, params}`, no id |
//!
//! Inbound frames are classified by the codec into the [`Frame`] union;
//! see [`codec`](super::codec) for the classification rules.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

// ============================================================================
// RequestFrame
// ============================================================================

/// An outbound protocol call.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Page.navigate",
///   "params": { "url": "https://example.com" }
/// }
/// ```
///
/// `params` is omitted entirely when the method takes no payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestFrame {
    /// Correlation id, unique per connection.
    pub id: CallId,

    /// Protocol method in `Domain.method` format.
    pub method: String,

    /// Method parameters, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestFrame {
    /// Creates a new request frame.
    #[inline]
    #[must_use]
    pub fn new(id: CallId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}

// ============================================================================
// RemoteError
// ============================================================================

/// Error payload of a rejected call.
///
/// # Format
///
/// ```json
/// { "code": -32000, "message": "Target closed", "data": "..." }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteError {
    /// Protocol error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,

    /// Optional error payload.
    #[serde(default)]
    pub data: Option<Value>,
}

// ============================================================================
// ResponseFrame
// ============================================================================

/// Outcome carried by a response frame.
///
/// Exactly one of `result` / `error` is present on the wire; the codec
/// rejects frames violating that as malformed, so this union has no
/// "both" or "neither" state.
#[derive(Debug, Clone)]
pub enum ResponseOutcome {
    /// The call succeeded with this raw result payload.
    Success(Value),
    /// The remote end rejected the call.
    Error(RemoteError),
}

/// An inbound response to a previously issued call.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    /// Id echoed back from the matching request.
    pub id: CallId,

    /// Success payload or remote rejection.
    pub outcome: ResponseOutcome,
}

impl ResponseFrame {
    /// Converts the outcome into a crate-level result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] when the remote end rejected the call.
    pub fn into_result(self) -> Result<Value> {
        match self.outcome {
            ResponseOutcome::Success(value) => Ok(value),
            ResponseOutcome::Error(err) => Err(Error::remote(err.code, err.message, err.data)),
        }
    }
}

// ============================================================================
// EventFrame
// ============================================================================

/// An unsolicited event pushed by the remote end.
///
/// # Format
///
/// ```json
/// {
///   "method": "Network.requestWillBeSent",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EventFrame {
    /// Event name in `Domain.event` format.
    pub method: String,

    /// Event payload, if any.
    #[serde(default)]
    pub params: Option<Value>,
}

impl EventFrame {
    /// Returns the domain part of the event name.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = EventFrame { method: "Page.frameNavigated".into(), params: None };
    /// assert_eq!(event.domain(), "Page");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event part of the event name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Takes the payload, substituting an empty object when absent.
    ///
    /// Events with no parameters decode into empty structs this way.
    #[inline]
    #[must_use]
    pub fn take_params(self) -> Value {
        self.params.unwrap_or_else(|| Value::Object(Default::default()))
    }
}

// ============================================================================
// Frame
// ============================================================================

/// A classified inbound frame.
#[derive(Debug, Clone)]
pub enum Frame {
    /// A response to a pending call, routed to the dispatcher.
    Response(ResponseFrame),
    /// An unsolicited event, routed to the event hub.
    Event(EventFrame),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_method_split() {
        let event = EventFrame {
            method: "Network.requestWillBeSent".into(),
            params: None,
        };
        assert_eq!(event.domain(), "Network");
        assert_eq!(event.name(), "requestWillBeSent");
    }

    #[test]
    fn test_event_method_split_without_dot() {
        let event = EventFrame {
            method: "bogus".into(),
            params: None,
        };
        assert_eq!(event.domain(), "bogus");
        assert_eq!(event.name(), "");
    }

    #[test]
    fn test_take_params_defaults_to_empty_object() {
        let event = EventFrame {
            method: "DOM.documentUpdated".into(),
            params: None,
        };
        assert_eq!(event.take_params(), json!({}));
    }

    #[test]
    fn test_into_result_success() {
        let frame = ResponseFrame {
            id: CallId::new(1),
            outcome: ResponseOutcome::Success(json!({"frameId": "F1"})),
        };
        let value = frame.into_result().expect("success");
        assert_eq!(value["frameId"], "F1");
    }

    #[test]
    fn test_into_result_error() {
        let frame = ResponseFrame {
            id: CallId::new(1),
            outcome: ResponseOutcome::Error(RemoteError {
                code: -32601,
                message: "method not found".into(),
                data: None,
            }),
        };
        let err = frame.into_result().unwrap_err();
        assert!(matches!(err, Error::Remote { code: -32601, .. }));
    }
}
