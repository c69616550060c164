//! Runtime domain: JavaScript evaluation in the inspected context.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// RuntimeDomain
// ============================================================================

/// Methods and events of the `Runtime` domain.
#[derive(Clone)]
pub struct RuntimeDomain {
    connection: Connection,
}

impl RuntimeDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "Runtime";

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

    /// Enables execution-context reporting.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Runtime.enable", None)
            .await
            .map(drop)
    }

    /// Disables execution-context reporting.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Runtime.disable", None)
            .await
            .map(drop)
    }

    /// Evaluates an expression on the global object.
    pub async fn evaluate(&self, params: &EvaluateParams) -> Result<EvaluateResult> {
        self.connection.request("Runtime.evaluate", Some(params)).await
    }

    /// Fired when a new execution context is created.
    #[must_use]
    pub fn execution_context_created(&self) -> EventStream<ExecutionContextCreatedEvent> {
        self.connection.events("Runtime.executionContextCreated")
    }

    /// All events of this domain as raw envelopes.
    #[must_use]
    pub fn events(&self) -> EventFrames {
        self.connection.domain_events(Self::NAME)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Parameters for [`RuntimeDomain::evaluate`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    /// Expression to evaluate.
    pub expression: String,

    /// Return the result by value rather than as a remote reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,

    /// Await the result if the expression evaluates to a promise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
}

impl EvaluateParams {
    /// Creates evaluation params for an expression.
    #[must_use]
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            return_by_value: None,
            await_promise: None,
        }
    }
}

/// A mirror of a JavaScript object in the inspected context.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type (`"object"`, `"string"`, `"number"`, ...).
    #[serde(rename = "type")]
    pub object_type: String,

    /// Primitive value or serialized content, when returned by value.
    #[serde(default)]
    pub value: Option<Value>,

    /// String representation of the object.
    #[serde(default)]
    pub description: Option<String>,

    /// Unique id for remote references.
    #[serde(default)]
    pub object_id: Option<String>,
}

/// Detailed information about an exception.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception id.
    pub exception_id: i64,
    /// Exception text.
    pub text: String,
    /// Line number of the exception location, zero-based.
    pub line_number: i64,
    /// Column number of the exception location, zero-based.
    pub column_number: i64,
}

/// Result of [`RuntimeDomain::evaluate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    /// Evaluation result.
    pub result: RemoteObject,

    /// Present when the evaluation threw.
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

/// Description of an execution context.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextDescription {
    /// Context id, unique per target.
    pub id: i64,
    /// Origin of the context.
    pub origin: String,
    /// Human-readable name.
    pub name: String,
}

/// Payload of `Runtime.executionContextCreated`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextCreatedEvent {
    /// The newly created context.
    pub context: ExecutionContextDescription,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluate_result_decodes_value_and_exception() {
        let result: EvaluateResult = serde_json::from_value(json!({
            "result": {"type": "number", "value": 4, "description": "4"}
        }))
        .expect("decode");
        assert_eq!(result.result.object_type, "number");
        assert_eq!(result.result.value, Some(json!(4)));
        assert!(result.exception_details.is_none());

        let thrown: EvaluateResult = serde_json::from_value(json!({
            "result": {"type": "object", "objectId": "obj-1"},
            "exceptionDetails": {
                "exceptionId": 1,
                "text": "Uncaught",
                "lineNumber": 0,
                "columnNumber": 7
            }
        }))
        .expect("decode");
        assert_eq!(thrown.exception_details.expect("details").column_number, 7);
    }

    #[test]
    fn test_evaluate_params_wire_shape() {
        let params = EvaluateParams {
            return_by_value: Some(true),
            ..EvaluateParams::new("2 + 2")
        };
        let value = serde_json::to_value(&params).expect("serialize");
        assert_eq!(value, json!({"expression": "2 + 2", "returnByValue": true}));
    }
}
