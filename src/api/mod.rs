//! Domain wrappers over the connection facade.
//!
//! Each submodule wraps one protocol domain: typed parameter, result and
//! event structs plus methods that are one line deep into
//! [`Connection::request`] / [`Connection::events`]. Wrappers carry
//! their dependency declarations as data (`NAME` / `DEPENDENCIES`
//! consts, mirrored in [`registry`]) and expose `ensure_activated` so
//! callers can satisfy activation ordering before the first call.
//!
//! The full protocol schema is far larger than this; these domains are
//! the surface the runtime is exercised through, written by hand in the
//! shape a generator would emit.
//!
//! # Modules
//!
//! | Module | Domain | Dependencies |
//! |--------|--------|--------------|
//! | [`page`] | `Page` | Debugger, DOM, IO, Network, Runtime |
//! | [`network`] | `Network` | — |
//! | [`runtime`] | `Runtime` | — |
//! | [`dom`] | `DOM` | — |
//! | [`debugger`] | `Debugger` | Runtime |
//! | [`io`] | `IO` | — (no enable method) |
//! | [`log`] | `Log` | Runtime, Network |
//!
//! [`Connection::request`]: crate::Connection::request
//! [`Connection::events`]: crate::Connection::events

// ============================================================================
// Submodules
// ============================================================================

/// Debugger domain.
pub mod debugger;

/// DOM domain.
pub mod dom;

/// IO domain.
pub mod io;

/// Log domain.
pub mod log;

/// Network domain.
pub mod network;

/// Page domain.
pub mod page;

/// Static dependency declarations.
pub mod registry;

/// Runtime domain.
pub mod runtime;

// ============================================================================
// Imports
// ============================================================================

use crate::connection::{Connection, EventFrames};
use crate::error::Result;

use debugger::DebuggerDomain;
use dom::DomDomain;
use io::IoDomain;
use log::LogDomain;
use network::NetworkDomain;
use page::PageDomain;
use runtime::RuntimeDomain;

// ============================================================================
// DevTools
// ============================================================================

/// All protocol domains over one connection.
///
/// Cheap to clone; domain accessors hand out wrappers sharing the same
/// underlying connection.
#[derive(Clone)]
pub struct DevTools {
    connection: Connection,
}

impl DevTools {
    /// Dials a debugger WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the endpoint URL is invalid
    /// - [`Error::WebSocket`] if the handshake fails
    ///
    /// [`Error::Connect`]: crate::Error::Connect
    /// [`Error::WebSocket`]: crate::Error::WebSocket
    pub async fn connect(endpoint: &str) -> Result<Self> {
        Ok(Self::new(Connection::connect(endpoint).await?))
    }

    /// Wraps an existing connection.
    #[inline]
    #[must_use]
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Page domain.
    #[must_use]
    pub fn page(&self) -> PageDomain {
        PageDomain::new(self.connection.clone())
    }

    /// Network domain.
    #[must_use]
    pub fn network(&self) -> NetworkDomain {
        NetworkDomain::new(self.connection.clone())
    }

    /// Runtime domain.
    #[must_use]
    pub fn runtime(&self) -> RuntimeDomain {
        RuntimeDomain::new(self.connection.clone())
    }

    /// DOM domain.
    #[must_use]
    pub fn dom(&self) -> DomDomain {
        DomDomain::new(self.connection.clone())
    }

    /// Debugger domain.
    #[must_use]
    pub fn debugger(&self) -> DebuggerDomain {
        DebuggerDomain::new(self.connection.clone())
    }

    /// IO domain.
    #[must_use]
    pub fn io(&self) -> IoDomain {
        IoDomain::new(self.connection.clone())
    }

    /// Log domain.
    #[must_use]
    pub fn log(&self) -> LogDomain {
        LogDomain::new(self.connection.clone())
    }

    /// Every event on this connection as raw envelopes.
    #[must_use]
    pub fn all_events(&self) -> EventFrames {
        self.connection.all_events()
    }

    /// Closes the underlying connection.
    pub fn close(&self) {
        self.connection.close();
    }
}

// ============================================================================
// Tests
// ============================================================================
