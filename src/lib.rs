//! Chrome DevTools Protocol client runtime.
//!
//! This library owns one bidirectional JSON-over-WebSocket connection to
//! a remote debugging target and multiplexes everything over it: many
//! concurrent outstanding calls, many concurrent event subscriptions,
//! and domain-activation ordering.
//!
//! # Architecture
//!
//! Each connection spawns a single I/O task that owns the transport.
//! Inbound frames are decoded once and routed by kind: responses to the
//! request dispatcher (matched to their caller purely by correlation
//! id), events to the hub (fanned out to every matching subscription
//! over its own queue). Callers never touch the transport directly and
//! never block the I/O task.
//!
//! Key design principles:
//!
//! - Responses match by id, never by send order; the remote may answer
//!   out of order
//! - One slow event consumer never delays another
//! - A domain's dependencies are enabled exactly once per connection,
//!   before the domain itself
//! - Only transport loss is fatal; per-call and per-event failures stay
//!   scoped to their caller
//!
//! # Quick Start
//!
//! ```no_run
//! use chrome_devtools_client::{DevTools, Result};
//! use chrome_devtools_client::api::page::NavigateParams;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // The page's webSocketDebuggerUrl, as listed at
//!     // http://localhost:9222/json
//!     let devtools = DevTools::connect("ws://localhost:9222/devtools/page/ABC123").await?;
//!
//!     let page = devtools.page();
//!     page.ensure_activated().await?;
//!
//!     let mut loaded = page.load_event_fired();
//!     page.navigate(&NavigateParams::new("https://example.com")).await?;
//!     loaded.next().await;
//!
//!     devtools.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Domain wrappers: [`DevTools`], Page, Network, ... |
//! | [`connection`] | Connection facade, dispatcher, event hub, activation |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire frame types and codec (internal) |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Domain wrappers and the [`DevTools`] aggregate.
pub mod api;

/// Connection facade and the runtime behind it.
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
pub mod identifiers;

/// Wire protocol message types.
///
/// Internal module defining frame structures and the codec.
pub mod protocol;

/// Message transport layer.
///
/// Internal module handling the WebSocket channel.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Connection types
pub use connection::{Connection, DependencyGraph, EventFrames, EventStream};

// Domain types
pub use api::DevTools;

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CallId, SubscriptionId};

// Transport types
pub use transport::{Transport, WebSocketTransport};
