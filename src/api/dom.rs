//! DOM domain: read access to the document structure.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// DomDomain
// ============================================================================

/// Methods and events of the `DOM` domain.
#[derive(Clone)]
pub struct DomDomain {
    connection: Connection,
}

impl DomDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "DOM";

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

    /// Enables DOM agent notifications.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("DOM.enable", None)
            .await
            .map(drop)
    }

    /// Disables DOM agent notifications.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("DOM.disable", None)
            .await
            .map(drop)
    }

    /// Returns the document root, to the requested depth.
    pub async fn get_document(&self, params: &GetDocumentParams) -> Result<GetDocumentResult> {
        self.connection.request("DOM.getDocument", Some(params)).await
    }

    /// Fired when the document has been totally updated; node ids are
    /// no longer valid.
    #[must_use]
    pub fn document_updated(&self) -> EventStream<DocumentUpdatedEvent> {
        self.connection.events("DOM.documentUpdated")
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

/// Parameters for [`DomDomain::get_document`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentParams {
    /// Maximum depth of the retrieved subtree; -1 for the whole tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,

    /// Traverse into iframes and shadow roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pierce: Option<bool>,
}

/// Result of [`DomDomain::get_document`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDocumentResult {
    /// The document root node.
    pub root: Node,
}

/// A DOM node mirror.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Node id, scoped to this connection.
    pub node_id: i64,

    /// Backend node id, stable across the target's lifetime.
    pub backend_node_id: i64,

    /// `Node.nodeType` value.
    pub node_type: i64,

    /// `Node.nodeName` value.
    pub node_name: String,

    /// Child nodes, when requested depth reaches them.
    #[serde(default)]
    pub children: Vec<Node>,

    /// Flat `[name, value, ...]` attribute pairs.
    #[serde(default)]
    pub attributes: Vec<String>,
}

/// Payload of `DOM.documentUpdated` (carries no fields).
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentUpdatedEvent {}

// ============================================================================
// Tests
// ============================================================================
