//! Request dispatch and response correlation.
//!
//! The dispatcher owns the pending-call table: it allocates correlation
//! ids, registers one completion slot per outstanding call, and resolves
//! the slot when the matching response arrives. Responses are matched
//! purely by id; the remote end may answer in any order.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::CallId;
use crate::protocol::{FrameCodec, RequestFrame, ResponseFrame};

// ============================================================================
// IoCommand
// ============================================================================

/// Commands handed to the connection's I/O loop.
pub(crate) enum IoCommand {
    /// Send an encoded request frame.
    Send {
        /// Correlation id of the frame, for logging.
        id: CallId,
        /// Encoded frame text.
        text: String,
    },
    /// Close the transport and terminate the loop.
    Shutdown,
}

// ============================================================================
// PendingCall
// ============================================================================

/// One outstanding call awaiting its response.
struct PendingCall {
    /// Method the call was issued for.
    method: String,
    /// Completion slot, fulfilled exactly once.
    tx: oneshot::Sender<Result<Value>>,
    /// When the call was registered.
    created_at: Instant,
}

/// Pending-call table plus the closed flag, guarded together so a call
/// registered concurrently with closure is either drained or rejected,
/// never stranded.
struct PendingTable {
    calls: FxHashMap<CallId, PendingCall>,
    closed: bool,
}

// ============================================================================
// RequestDispatcher
// ============================================================================

/// Correlates outbound calls with inbound responses.
///
/// # Thread Safety
///
/// `RequestDispatcher` is shared behind an `Arc` between the connection
/// facade and the I/O loop; all operations are non-blocking apart from
/// awaiting a call's own completion.
pub(crate) struct RequestDispatcher {
    /// Next correlation id to hand out.
    next_id: AtomicU64,
    /// Outstanding calls keyed by id.
    pending: Mutex<PendingTable>,
    /// Outbound path to the I/O loop.
    command_tx: mpsc::UnboundedSender<IoCommand>,
}

impl RequestDispatcher {
    /// Creates a dispatcher writing outbound frames to `command_tx`.
    pub(crate) fn new(command_tx: mpsc::UnboundedSender<IoCommand>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(PendingTable {
                calls: FxHashMap::default(),
                closed: false,
            }),
            command_tx,
        }
    }

    /// Issues a call and suspends until its response arrives or the
    /// connection fails.
    ///
    /// Concurrent calls are fully independent; each gets a fresh id.
    /// If the caller abandons the returned future (timeout, drop), the
    /// pending entry is evicted so a late response takes the unknown-id
    /// path instead of leaking table space.
    ///
    /// # Errors
    ///
    /// - [`Error::TransportClosed`] if the connection is already gone or
    ///   dies while the call is outstanding
    /// - [`Error::Remote`] if the remote end rejected the call
    /// - [`Error::Json`] if the params cannot be encoded
    pub(crate) async fn call(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let (id, rx) = self.register(method)?;
        let _guard = PendingGuard {
            dispatcher: self,
            id,
        };

        let text = FrameCodec::encode(&RequestFrame::new(id, method, params))?;

        if self
            .command_tx
            .send(IoCommand::Send { id, text })
            .is_err()
        {
            return Err(Error::TransportClosed);
        }

        trace!(%id, method, "Request dispatched");

        rx.await.map_err(|_| Error::TransportClosed)?
    }

    /// Registers a pending call and returns its id and completion handle.
    fn register(&self, method: &str) -> Result<(CallId, oneshot::Receiver<Result<Value>>)> {
        let mut table = self.pending.lock();

        if table.closed {
            return Err(Error::TransportClosed);
        }

        let id = CallId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();

        table.calls.insert(
            id,
            PendingCall {
                method: method.to_owned(),
                tx,
                created_at: Instant::now(),
            },
        );

        Ok((id, rx))
    }

    /// Routes an inbound response to its pending call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmatchedResponse`] when no call is pending for
    /// the response's id (stale or forged); the caller logs and discards
    /// it, other pending calls are unaffected.
    pub(crate) fn on_response(&self, response: ResponseFrame) -> Result<()> {
        let id = response.id;

        let Some(call) = self.pending.lock().calls.remove(&id) else {
            return Err(Error::unmatched(id));
        };

        trace!(
            %id,
            method = %call.method,
            elapsed_ms = call.created_at.elapsed().as_millis() as u64,
            "Response matched"
        );

        if call.tx.send(response.into_result()).is_err() {
            debug!(%id, "Caller gone before response delivery");
        }

        Ok(())
    }

    /// Fails every pending call and rejects all future ones.
    ///
    /// Invoked exactly once, when the transport reports closure. Calls
    /// issued afterwards fail fast without attempting to send.
    pub(crate) fn fail_all(&self) {
        let drained: Vec<_> = {
            let mut table = self.pending.lock();
            table.closed = true;
            table.calls.drain().collect()
        };

        let count = drained.len();
        for (_, call) in drained {
            let _ = call.tx.send(Err(Error::TransportClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending calls on transport closure");
        }
    }

    /// Evicts a pending call without resolving it.
    fn discard(&self, id: CallId) {
        if let Some(call) = self.pending.lock().calls.remove(&id) {
            debug!(%id, method = %call.method, "Evicted abandoned call");
        }
    }

    /// Returns the number of outstanding calls.
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().calls.len()
    }

    /// Returns `true` once the connection has failed.
    pub(crate) fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }
}

// ============================================================================
// PendingGuard
// ============================================================================

/// Evicts the pending entry when a `call` future is dropped before its
/// response was delivered. After normal completion the entry is already
/// gone and the drop is a no-op.
struct PendingGuard<'a> {
    dispatcher: &'a RequestDispatcher,
    id: CallId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.dispatcher.discard(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================
