//! Debugger domain: pausing and resuming JavaScript execution.
//!
//! Depends on Runtime.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// DebuggerDomain
// ============================================================================

/// Methods and events of the `Debugger` domain.
#[derive(Clone)]
pub struct DebuggerDomain {
    connection: Connection,
}

impl DebuggerDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "Debugger";

    /// Domains that must be enabled before this one.
    pub const DEPENDENCIES: &'static [&'static str] = &["Runtime"];

    /// Creates a wrapper over `connection`.
    #[inline]
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Activates this domain and its dependencies, exactly once per
    /// connection.
    pub async fn ensure_activated(&self) -> Result<()> {
        self.connection
            .ensure_activated(Self::NAME, Self::DEPENDENCIES)
            .await
    }

    /// Enables the debugger for the target.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Debugger.enable", None)
            .await
            .map(drop)
    }

    /// Disables the debugger.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Debugger.disable", None)
            .await
            .map(drop)
    }

    /// Stops on the next JavaScript statement.
    pub async fn pause(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Debugger.pause", None)
            .await
            .map(drop)
    }

    /// Resumes JavaScript execution.
    pub async fn resume(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Debugger.resume", None)
            .await
            .map(drop)
    }

    /// Fired when the virtual machine stopped on a breakpoint or
    /// exception.
    #[must_use]
    pub fn paused(&self) -> EventStream<PausedEvent> {
        self.connection.events("Debugger.paused")
    }

    /// Fired when the virtual machine resumed execution.
    #[must_use]
    pub fn resumed(&self) -> EventStream<ResumedEvent> {
        self.connection.events("Debugger.resumed")
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

/// Payload of `Debugger.paused`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PausedEvent {
    /// Pause reason (`"breakpoint"`, `"exception"`, ...).
    pub reason: String,

    /// Breakpoints hit, if any.
    #[serde(default)]
    pub hit_breakpoints: Vec<String>,
}

/// Payload of `Debugger.resumed` (carries no fields).
#[derive(Debug, Clone, Deserialize)]
pub struct ResumedEvent {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paused_event_decodes() {
        let event: PausedEvent = serde_json::from_value(json!({
            "reason": "breakpoint",
            "hitBreakpoints": ["bp-1"],
            "callFrames": []
        }))
        .expect("decode");

        assert_eq!(event.reason, "breakpoint");
        assert_eq!(event.hit_breakpoints, vec!["bp-1"]);
    }

    #[test]
    fn test_paused_event_defaults_breakpoints() {
        let event: PausedEvent =
            serde_json::from_value(json!({"reason": "other"})).expect("decode");
        assert!(event.hit_breakpoints.is_empty());
    }
}
