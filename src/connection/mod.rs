//! Protocol connection runtime.
//!
//! This module composes the transport, codec, dispatcher, event hub and
//! domain activator behind the [`Connection`] facade that every domain
//! wrapper calls.
//!
//! # I/O Loop
//!
//! Each connection spawns one tokio task that owns the transport. The
//! task selects between:
//!
//! - Inbound frames: decoded exactly once, responses routed to the
//!   dispatcher, events to the hub. This is the only place frames are
//!   decoded, preserving a single linear view of arrival order.
//! - Outbound commands: encoded requests from callers, or shutdown.
//!
//! Callers suspend only on their own completion handles and never block
//! the loop. When the transport reports closure the loop drains every
//! pending call with [`Error::TransportClosed`] and ends all event
//! streams, exactly once.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Correlation ids and the pending-call table |
//! | `hub` | Event fan-out and subscription streams |
//! | `activation` | Domain dependency activation |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{Frame, FrameCodec};
use crate::transport::{Transport, WebSocketTransport};

// ============================================================================
// Submodules
// ============================================================================

/// Correlation ids and the pending-call table.
mod dispatcher;

/// Event fan-out and subscription streams.
mod hub;

/// Domain dependency activation.
mod activation;

// ============================================================================
// Re-exports
// ============================================================================

pub use activation::DependencyGraph;
pub use hub::{EventFrames, EventStream};

use activation::DomainActivator;
use dispatcher::{IoCommand, RequestDispatcher};
use hub::EventHub;

// ============================================================================
// Connection
// ============================================================================

/// A connection to one remote debugging target.
///
/// Cheap to clone; all clones share the same transport, pending-call
/// table and subscriptions. The connection stays alive until [`close`]
/// is called or the remote end disconnects; dropping handles does not
/// tear it down.
///
/// [`close`]: Connection::close
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    dispatcher: Arc<RequestDispatcher>,
    hub: Arc<EventHub>,
    activator: DomainActivator,
    command_tx: mpsc::UnboundedSender<IoCommand>,
}

impl Connection {
    /// Dials a debugger WebSocket endpoint and starts the I/O loop,
    /// with the standard protocol dependency graph.
    ///
    /// # Errors
    ///
    /// - [`Error::Connect`] if the endpoint URL is invalid
    /// - [`Error::WebSocket`] if the handshake fails
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let transport = WebSocketTransport::connect(endpoint).await?;
        Ok(Self::attach(
            Box::new(transport),
            crate::api::registry::default_graph(),
        ))
    }

    /// Wraps an already-established transport.
    ///
    /// Spawns the I/O loop task internally. `graph` supplies the domain
    /// dependency declarations consumed by [`ensure_activated`].
    ///
    /// [`ensure_activated`]: Connection::ensure_activated
    #[must_use]
    pub fn attach(transport: Box<dyn Transport>, graph: DependencyGraph) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(RequestDispatcher::new(command_tx.clone()));
        let hub = Arc::new(EventHub::new());

        tokio::spawn(run_io_loop(
            transport,
            command_rx,
            Arc::clone(&dispatcher),
            Arc::clone(&hub),
        ));

        let activator = DomainActivator::new(Arc::clone(&dispatcher), graph);

        Self {
            inner: Arc::new(ConnectionInner {
                dispatcher,
                hub,
                activator,
                command_tx,
            }),
        }
    }

    /// Issues a call and decodes its result into `R`.
    ///
    /// # Errors
    ///
    /// - [`Error::TransportClosed`] if the connection is gone
    /// - [`Error::Remote`] if the remote end rejected the call
    /// - [`Error::Decode`] if the result payload does not match `R`
    pub async fn request<P, R>(&self, method: &str, params: Option<&P>) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = params.map(serde_json::to_value).transpose()?;
        let raw = self.inner.dispatcher.call(method, params).await?;
        serde_json::from_value(raw).map_err(|e| Error::decode(method, e))
    }

    /// Issues a call with an upper bound on the wait.
    ///
    /// The core never times calls out on its own; this is the caller
    /// layer's bound. On expiry the pending entry is evicted, so a
    /// response arriving later is discarded on the unknown-id path.
    ///
    /// # Errors
    ///
    /// As [`request`], plus [`Error::RequestTimeout`] on expiry.
    ///
    /// [`request`]: Connection::request
    pub async fn request_with_timeout<P, R>(
        &self,
        method: &str,
        params: Option<&P>,
        timeout: Duration,
    ) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        match tokio::time::timeout(timeout, self.request(method, params)).await {
            Ok(result) => result,
            Err(_) => Err(Error::request_timeout(method, timeout.as_millis() as u64)),
        }
    }

    /// Subscribes to one event, decoding each payload into `E`.
    ///
    /// Every call yields an independent stream; all streams subscribed
    /// to the same event receive every occurrence. Dropping the stream
    /// unsubscribes it.
    #[must_use]
    pub fn events<E>(&self, method: &str) -> EventStream<E>
    where
        E: DeserializeOwned,
    {
        EventStream::new(self.inner.hub.subscribe(Some(method)), method)
    }

    /// Subscribes to every event as raw envelopes.
    #[must_use]
    pub fn all_events(&self) -> EventFrames {
        self.inner.hub.subscribe(None)
    }

    /// Subscribes to every event of one domain as raw envelopes.
    pub(crate) fn domain_events(&self, domain: &str) -> EventFrames {
        self.inner.hub.subscribe(None).scoped_to(domain)
    }

    /// Ensures a domain and its transitive dependencies are activated.
    ///
    /// `dependencies` declares the domain's direct dependencies for
    /// graphs that have no entry for it; the connection's graph wins
    /// when both exist. Activation happens exactly once per domain per
    /// connection, dependencies first.
    ///
    /// # Errors
    ///
    /// - [`Error::CyclicDependency`] if the dependency closure cycles
    /// - any failure of an activation call itself
    pub async fn ensure_activated(&self, domain: &str, dependencies: &[&str]) -> Result<()> {
        self.inner.activator.ensure_activated(domain, dependencies).await
    }

    /// Returns the number of calls currently awaiting responses.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.dispatcher.pending_count()
    }

    /// Returns `true` once the connection has failed or been closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.dispatcher.is_closed()
    }

    /// Closes the connection.
    ///
    /// Pending calls fail with [`Error::TransportClosed`]; event streams
    /// end after draining what was already delivered.
    pub fn close(&self) {
        let _ = self.inner.command_tx.send(IoCommand::Shutdown);
    }
}

// ============================================================================
// I/O Loop
// ============================================================================

/// Owns the transport: decodes and routes inbound frames, writes
/// outbound ones, and tears everything down exactly once on closure.
async fn run_io_loop(
    mut transport: Box<dyn Transport>,
    mut command_rx: mpsc::UnboundedReceiver<IoCommand>,
    dispatcher: Arc<RequestDispatcher>,
    hub: Arc<EventHub>,
) {
    loop {
        tokio::select! {
            inbound = transport.next() => {
                match inbound {
                    Ok(Some(text)) => route_frame(&text, &dispatcher, &hub),

                    Ok(None) => {
                        debug!("Transport closed by remote");
                        break;
                    }

                    Err(e) => {
                        error!(error = %e, "Transport failure");
                        break;
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(IoCommand::Send { id, text }) => {
                        if let Err(e) = transport.send(text).await {
                            error!(%id, error = %e, "Send failed; closing connection");
                            break;
                        }
                        trace!(%id, "Request sent");
                    }

                    Some(IoCommand::Shutdown) => {
                        debug!("Shutdown command received");
                        let _ = transport.close().await;
                        break;
                    }

                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                }
            }
        }
    }

    // Fail outstanding work exactly once.
    dispatcher.fail_all();
    hub.close();

    debug!("I/O loop terminated");
}

/// Decodes one inbound frame and routes it.
///
/// Anomalies scoped to a single frame are logged and discarded; they
/// never abort the connection.
fn route_frame(text: &str, dispatcher: &RequestDispatcher, hub: &EventHub) {
    match FrameCodec::decode(text) {
        Ok(Frame::Response(response)) => {
            if let Err(e) = dispatcher.on_response(response) {
                warn!(error = %e, "Discarding response");
            }
        }
        Ok(Frame::Event(event)) => hub.publish(&event),
        Err(e) => warn!(error = %e, "Discarding inbound frame"),
    }
}

// ============================================================================
// Tests
// ============================================================================
