//! Page domain: navigation and lifecycle of the inspected page.
//!
//! Depends on Debugger, DOM, IO, Network and Runtime; call
//! [`PageDomain::ensure_activated`] before the first method.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// PageDomain
// ============================================================================

/// Methods and events of the `Page` domain.
#[derive(Clone)]
pub struct PageDomain {
    connection: Connection,
}

impl PageDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "Page";

    /// Domains that must be enabled before this one.
    pub const DEPENDENCIES: &'static [&'static str] =
        &["Debugger", "DOM", "IO", "Network", "Runtime"];

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

    /// Enables page domain notifications.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Page.enable", None)
            .await
            .map(drop)
    }

    /// Disables page domain notifications.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Page.disable", None)
            .await
            .map(drop)
    }

    /// Navigates the page to the given URL.
    pub async fn navigate(&self, params: &NavigateParams) -> Result<NavigateResult> {
        self.connection.request("Page.navigate", Some(params)).await
    }

    /// Reloads the page.
    pub async fn reload(&self, params: &ReloadParams) -> Result<()> {
        self.connection
            .request::<ReloadParams, Value>("Page.reload", Some(params))
            .await
            .map(drop)
    }

    /// Fired once navigation of a frame has completed.
    #[must_use]
    pub fn frame_navigated(&self) -> EventStream<FrameNavigatedEvent> {
        self.connection.events("Page.frameNavigated")
    }

    /// Fired when the page's `load` event has fired.
    #[must_use]
    pub fn load_event_fired(&self) -> EventStream<LoadEventFiredEvent> {
        self.connection.events("Page.loadEventFired")
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

/// Parameters for [`PageDomain::navigate`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
    /// URL to navigate the page to.
    pub url: String,

    /// Referrer URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    /// Intended transition type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_type: Option<String>,

    /// Frame to navigate; the top frame when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
}

impl NavigateParams {
    /// Creates navigation params for a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referrer: None,
            transition_type: None,
            frame_id: None,
        }
    }
}

/// Result of [`PageDomain::navigate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
    /// Frame the navigation happened in.
    pub frame_id: String,

    /// Loader identifier; absent for same-document navigations.
    #[serde(default)]
    pub loader_id: Option<String>,

    /// User-friendly error message when navigation failed.
    #[serde(default)]
    pub error_text: Option<String>,
}

/// Parameters for [`PageDomain::reload`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
    /// Reload bypassing the cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_cache: Option<bool>,

    /// Script to inject into every frame on reload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_to_evaluate_on_load: Option<String>,
}

/// Information about a frame on the page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameInfo {
    /// Frame unique identifier.
    pub id: String,

    /// Parent frame identifier; absent for the top frame.
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Loader identifier.
    #[serde(default)]
    pub loader_id: Option<String>,

    /// Frame document's URL.
    pub url: String,

    /// Frame document's security origin.
    #[serde(default)]
    pub security_origin: Option<String>,

    /// Frame document's MIME type.
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Payload of `Page.frameNavigated`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameNavigatedEvent {
    /// The frame that navigated.
    pub frame: FrameInfo,
}

/// Payload of `Page.loadEventFired`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadEventFiredEvent {
    /// Monotonic event timestamp, in seconds.
    pub timestamp: f64,
}

// ============================================================================
// Tests
// ============================================================================
