//! Log domain: entries reported by the browser's log.
//!
//! Depends on Runtime and Network.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// LogDomain
// ============================================================================

/// Methods and events of the `Log` domain.
#[derive(Clone)]
pub struct LogDomain {
    connection: Connection,
}

impl LogDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "Log";

    /// Domains that must be enabled before this one.
    pub const DEPENDENCIES: &'static [&'static str] = &["Runtime", "Network"];

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

    /// Enables log collection; already-collected entries are reported
    /// immediately.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Log.enable", None)
            .await
            .map(drop)
    }

    /// Disables log collection.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Log.disable", None)
            .await
            .map(drop)
    }

    /// Clears collected entries.
    pub async fn clear(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Log.clear", None)
            .await
            .map(drop)
    }

    /// Fired when a new log entry was added.
    #[must_use]
    pub fn entry_added(&self) -> EventStream<EntryAddedEvent> {
        self.connection.events("Log.entryAdded")
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

/// One log entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Entry source (`"network"`, `"javascript"`, ...).
    pub source: String,
    /// Entry severity.
    pub level: String,
    /// Logged text.
    pub text: String,
    /// Entry timestamp as UNIX time in milliseconds.
    pub timestamp: f64,
    /// URL of the resource the entry relates to.
    #[serde(default)]
    pub url: Option<String>,
}

/// Payload of `Log.entryAdded`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryAddedEvent {
    /// The added entry.
    pub entry: LogEntry,
}

// ============================================================================
// Tests
// ============================================================================
