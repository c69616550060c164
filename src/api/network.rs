//! Network domain: tracking of network activity for the inspected page.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connection::{Connection, EventFrames, EventStream};
use crate::error::Result;

// ============================================================================
// NetworkDomain
// ============================================================================

/// Methods and events of the `Network` domain.
#[derive(Clone)]
pub struct NetworkDomain {
    connection: Connection,
}

impl NetworkDomain {
    /// Domain name on the wire.
    pub const NAME: &'static str = "Network";

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

    /// Enables network tracking with default buffer sizes.
    pub async fn enable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Network.enable", None)
            .await
            .map(drop)
    }

    /// Enables network tracking with explicit buffer sizes.
    pub async fn enable_with(&self, params: &EnableParams) -> Result<()> {
        self.connection
            .request::<EnableParams, Value>("Network.enable", Some(params))
            .await
            .map(drop)
    }

    /// Disables network tracking.
    pub async fn disable(&self) -> Result<()> {
        self.connection
            .request::<Value, Value>("Network.disable", None)
            .await
            .map(drop)
    }

    /// Returns cookies for the given URLs, or all browser cookies.
    pub async fn get_cookies(&self, params: &GetCookiesParams) -> Result<GetCookiesResult> {
        self.connection
            .request("Network.getCookies", Some(params))
            .await
    }

    /// Toggles ignoring of the cache for each request.
    pub async fn set_cache_disabled(&self, cache_disabled: bool) -> Result<()> {
        let params = SetCacheDisabledParams { cache_disabled };
        self.connection
            .request::<SetCacheDisabledParams, Value>("Network.setCacheDisabled", Some(&params))
            .await
            .map(drop)
    }

    /// Fired when the page is about to send an HTTP request.
    #[must_use]
    pub fn request_will_be_sent(&self) -> EventStream<RequestWillBeSentEvent> {
        self.connection.events("Network.requestWillBeSent")
    }

    /// Fired when a data chunk was received over the network.
    #[must_use]
    pub fn data_received(&self) -> EventStream<DataReceivedEvent> {
        self.connection.events("Network.dataReceived")
    }

    /// Fired when a request failed to load.
    #[must_use]
    pub fn loading_failed(&self) -> EventStream<LoadingFailedEvent> {
        self.connection.events("Network.loadingFailed")
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

/// Parameters for [`NetworkDomain::enable_with`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    /// Buffer size in bytes for collected network payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_buffer_size: Option<i64>,

    /// Per-resource buffer size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_resource_buffer_size: Option<i64>,

    /// Longest post body size in bytes to include in the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_post_data_size: Option<i64>,
}

/// Parameters for [`NetworkDomain::get_cookies`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesParams {
    /// URLs to fetch cookies for; all browser cookies when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
}

/// Result of [`NetworkDomain::get_cookies`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesResult {
    /// The matching cookies.
    pub cookies: Vec<Cookie>,
}

/// A browser cookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie domain.
    pub domain: String,
    /// Cookie path.
    pub path: String,
    /// Expiry as UNIX time in seconds; negative for session cookies.
    pub expires: f64,
    /// Marked `HttpOnly`.
    #[serde(default)]
    pub http_only: bool,
    /// Marked `Secure`.
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetCacheDisabledParams {
    cache_disabled: bool,
}

/// An HTTP request as the page is about to send it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    /// Request URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Request headers as a flat object.
    #[serde(default)]
    pub headers: Value,
}

/// Payload of `Network.requestWillBeSent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestWillBeSentEvent {
    /// Request identifier.
    pub request_id: String,

    /// Loader identifier.
    #[serde(default)]
    pub loader_id: Option<String>,

    /// URL of the document the request belongs to.
    #[serde(rename = "documentURL")]
    pub document_url: String,

    /// The request itself.
    pub request: RequestInfo,

    /// Monotonic event timestamp, in seconds.
    pub timestamp: f64,
}

/// Payload of `Network.dataReceived`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReceivedEvent {
    /// Request identifier.
    pub request_id: String,
    /// Monotonic event timestamp, in seconds.
    pub timestamp: f64,
    /// Decoded chunk length in bytes.
    pub data_length: i64,
    /// Actual bytes received, after compression.
    pub encoded_data_length: i64,
}

/// Payload of `Network.loadingFailed`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFailedEvent {
    /// Request identifier.
    pub request_id: String,
    /// Monotonic event timestamp, in seconds.
    pub timestamp: f64,
    /// Resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Failure description.
    pub error_text: String,
    /// The request was canceled locally.
    #[serde(default)]
    pub canceled: bool,
}

// ============================================================================
// Tests
// ============================================================================
