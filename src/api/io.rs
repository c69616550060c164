//! IO domain: streamed reading of large payloads.
//!
//! This domain has no `enable` method; activation is a bookkeeping
//! no-op.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;

// ============================================================================
// IoDomain
// ============================================================================

/// Methods of the `IO` domain.
#[derive(Clone)]
pub struct IoDomain {
    connection: Connection,
}

impl IoDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "IO";

    /// Domains that must be enabled before this one.
    pub const DEPENDENCIES: &'static [&'static str] = &[];

    /// Creates a wrapper over `connection`.
    #[inline]
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Activates this domain, exactly once per connection.
    pub async fn ensure_activated(&self) -> Result<()> {
        self.connection
            .ensure_activated(Self::NAME, Self::DEPENDENCIES)
            .await
    }

    /// Reads a chunk of a stream.
    pub async fn read(&self, params: &ReadParams) -> Result<ReadResult> {
        self.connection.request("IO.read", Some(params)).await
    }

    /// Closes a stream and discards any pending data.
    pub async fn close(&self, handle: impl Into<String>) -> Result<()> {
        let params = CloseParams {
            handle: handle.into(),
        };
        self.connection
            .request::<CloseParams, Value>("IO.close", Some(&params))
            .await
            .map(drop)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Parameters for [`IoDomain::read`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    /// Stream handle.
    pub handle: String,

    /// Seek position before reading; continues from the current
    /// position when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,

    /// Maximum bytes to read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Result of [`IoDomain::read`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResult {
    /// Chunk data; base64 when `base64_encoded` is set.
    pub data: String,

    /// The data is base64-encoded.
    #[serde(default)]
    pub base64_encoded: bool,

    /// The end of the stream was reached.
    pub eof: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CloseParams {
    handle: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_result_decodes() {
        let result: ReadResult = serde_json::from_value(json!({
            "data": "PGh0bWw+",
            "base64Encoded": true,
            "eof": false
        }))
        .expect("decode");

        assert!(result.base64_encoded);
        assert!(!result.eof);
        assert_eq!(result.data, "PGh0bWw+");
    }

    #[test]
    fn test_read_params_wire_shape() {
        let params = ReadParams {
            handle: "stream-1".into(),
            offset: None,
            size: Some(4096),
        };
        let value = serde_json::to_value(&params).expect("serialize");
        assert_eq!(value, json!({"handle": "stream-1", "size": 4096}));
    }
}
