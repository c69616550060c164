//! Wire codec for protocol frames.
//!
//! Encodes outbound [`RequestFrame`]s to JSON text and classifies inbound
//! text into the [`Frame`] union.
//!
//! # Classification
//!
//! | Inbound shape | Classified as |
//! |---------------|---------------|
//! | `{id, result}` | [`Frame::Response`] with success outcome |
//! | `{id, error: {code, message}}` | [`Frame::Response`] with remote error |
//! | `{method, params?}`, no id | [`Frame::Event`] |
//! | anything else | [`Error::MalformedFrame`] |
//!
//! A frame carrying an `id` with both `result` and `error`, or with
//! neither, is a decode error here rather than an application-level error:
//! the remote end never legitimately produces such a frame.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CallId;

use super::frame::{EventFrame, Frame, RemoteError, RequestFrame, ResponseFrame, ResponseOutcome};

// ============================================================================
// FrameCodec
// ============================================================================

/// Stateless (de)serializer for protocol frames.
pub struct FrameCodec;

impl FrameCodec {
    /// Encodes a request frame to wire text.
    ///
    /// Deterministic for a given frame; the id is embedded so the remote
    /// end echoes it back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the params value cannot be serialized.
    pub fn encode(frame: &RequestFrame) -> Result<String> {
        Ok(serde_json::to_string(frame)?)
    }

    /// Decodes wire text into a classified frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] when the text is not a JSON
    /// object, carries neither `id` nor `method`, or carries an `id`
    /// without exactly one of `result` / `error`.
    pub fn decode(text: &str) -> Result<Frame> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::malformed(format!("invalid JSON: {e}")))?;

        let Value::Object(mut object) = value else {
            return Err(Error::malformed("frame is not a JSON object"));
        };

        match object.remove("id") {
            Some(id) => {
                let id = id
                    .as_u64()
                    .map(CallId::new)
                    .ok_or_else(|| Error::malformed("id is not an unsigned integer"))?;
                Self::decode_response(id, object)
            }
            None => Self::decode_event(object),
        }
    }

    /// Decodes the body of a frame that carried an id.
    fn decode_response(
        id: CallId,
        mut object: serde_json::Map<String, Value>,
    ) -> Result<Frame> {
        let result = object.remove("result");
        let error = object.remove("error");

        let outcome = match (result, error) {
            (Some(result), None) => ResponseOutcome::Success(result),
            (None, Some(error)) => {
                let error: RemoteError = serde_json::from_value(error)
                    .map_err(|e| Error::malformed(format!("invalid error object: {e}")))?;
                ResponseOutcome::Error(error)
            }
            (Some(_), Some(_)) => {
                return Err(Error::malformed("response carries both result and error"));
            }
            (None, None) => {
                return Err(Error::malformed("response carries neither result nor error"));
            }
        };

        Ok(Frame::Response(ResponseFrame { id, outcome }))
    }

    /// Decodes the body of a frame that carried no id.
    fn decode_event(mut object: serde_json::Map<String, Value>) -> Result<Frame> {
        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => return Err(Error::malformed("method is not a string")),
            None => return Err(Error::malformed("frame carries neither id nor method")),
        };

        Ok(Frame::Event(EventFrame {
            method,
            params: object.remove("params"),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(text: &str) -> Result<Frame> {
        FrameCodec::decode(text)
    }

    #[test]
    fn test_encode_embeds_id_and_method() {
        let frame = RequestFrame::new(
            CallId::new(3),
            "Page.navigate",
            Some(json!({"url": "https://example.com"})),
        );
        let text = FrameCodec::encode(&frame).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("valid JSON");

        assert_eq!(value["id"], 3);
        assert_eq!(value["method"], "Page.navigate");
        assert_eq!(value["params"]["url"], "https://example.com");
    }

    #[test]
    fn test_encode_omits_absent_params() {
        let frame = RequestFrame::new(CallId::new(1), "Network.enable", None);
        let text = FrameCodec::encode(&frame).expect("encode");

        assert!(!text.contains("params"));
    }

    #[test]
    fn test_decode_success_response() {
        let frame = decode(r#"{"id": 7, "result": {"cookies": []}}"#).expect("decode");
        let Frame::Response(response) = frame else {
            panic!("expected response");
        };
        assert_eq!(response.id, CallId::new(7));
        assert!(matches!(response.outcome, ResponseOutcome::Success(_)));
    }

    #[test]
    fn test_decode_error_response() {
        let frame =
            decode(r#"{"id": 7, "error": {"code": -32000, "message": "Target closed"}}"#)
                .expect("decode");
        let Frame::Response(response) = frame else {
            panic!("expected response");
        };
        let ResponseOutcome::Error(error) = response.outcome else {
            panic!("expected error outcome");
        };
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "Target closed");
        assert!(error.data.is_none());
    }

    #[test]
    fn test_decode_event() {
        let frame = decode(r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#)
            .expect("decode");
        let Frame::Event(event) = frame else {
            panic!("expected event");
        };
        assert_eq!(event.method, "Page.loadEventFired");
        assert_eq!(event.params.expect("params")["timestamp"], 1.5);
    }

    #[test]
    fn test_decode_event_without_params() {
        let frame = decode(r#"{"method": "DOM.documentUpdated"}"#).expect("decode");
        let Frame::Event(event) = frame else {
            panic!("expected event");
        };
        assert!(event.params.is_none());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(matches!(
            decode("not json"),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(decode("[1, 2]"), Err(Error::MalformedFrame { .. })));
    }

    #[test]
    fn test_decode_rejects_missing_id_and_method() {
        assert!(matches!(
            decode(r#"{"params": {}}"#),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_both_result_and_error() {
        assert!(matches!(
            decode(r#"{"id": 1, "result": {}, "error": {"code": 0, "message": "x"}}"#),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_neither_result_nor_error() {
        assert!(matches!(
            decode(r#"{"id": 1}"#),
            Err(Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_non_integer_id() {
        assert!(matches!(
            decode(r#"{"id": "abc", "result": {}}"#),
            Err(Error::MalformedFrame { .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Arbitrary input must classify or fail cleanly, never panic.
            #[test]
            fn decode_never_panics(text in "\\PC*") {
                let _ = FrameCodec::decode(&text);
            }

            #[test]
            fn decoded_responses_preserve_id(id in 0u64..u64::MAX) {
                let text = format!(r#"{{"id": {id}, "result": {{}}}}"#);
                let frame = FrameCodec::decode(&text).expect("decode");
                let Frame::Response(response) = frame else {
                    panic!("expected response");
                };
                prop_assert_eq!(response.id, CallId::new(id));
            }
        }
    }
}
