//! Event fan-out.
//!
//! The hub delivers every inbound event to all subscriptions whose filter
//! matches the event's method name. Each subscription owns an unbounded
//! delivery queue, so a stalled consumer costs memory but never delays
//! delivery to other subscribers or to the reader loop.
//!
//! Streams unsubscribe themselves on drop. When the connection dies the
//! hub closes every queue, ending all streams.

// ============================================================================
// Imports
// ============================================================================

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_util::Stream;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::SubscriptionId;
use crate::protocol::EventFrame;

// ============================================================================
// Subscriber
// ============================================================================

/// One registered subscription.
struct Subscriber {
    /// Exact method to match, or `None` to receive everything.
    filter: Option<String>,
    /// The subscriber's own delivery queue.
    tx: mpsc::UnboundedSender<EventFrame>,
}

impl Subscriber {
    fn matches(&self, method: &str) -> bool {
        match &self.filter {
            Some(filter) => filter == method,
            None => true,
        }
    }
}

/// Subscriber registry plus the closed flag, guarded together so a
/// subscription racing with connection teardown either registers before
/// the drain or observes the closed state.
struct HubInner {
    subscribers: FxHashMap<SubscriptionId, Subscriber>,
    closed: bool,
}

// ============================================================================
// EventHub
// ============================================================================

/// Fans decoded events out to all matching subscriptions.
///
/// # Thread Safety
///
/// Shared behind an `Arc` between the connection facade and the I/O
/// loop. `publish` never blocks on a consumer.
pub(crate) struct EventHub {
    inner: Mutex<HubInner>,
    next_id: AtomicU64,
}

impl EventHub {
    /// Creates an empty hub.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(HubInner {
                subscribers: FxHashMap::default(),
                closed: false,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a subscription and returns its raw event stream.
    ///
    /// `filter` is an exact method name (`"Network.requestWillBeSent"`);
    /// `None` subscribes to every event. Each call yields an independent
    /// stream; subscribing twice to the same method delivers every
    /// matching event to both.
    pub(crate) fn subscribe(self: &Arc<Self>, filter: Option<&str>) -> EventFrames {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut inner = self.inner.lock();
            if inner.closed {
                // The sender drops here; the stream ends immediately.
                trace!(%id, "Subscription on closed hub");
            } else {
                inner.subscribers.insert(
                    id,
                    Subscriber {
                        filter: filter.map(str::to_owned),
                        tx,
                    },
                );
                trace!(%id, ?filter, "Subscribed");
            }
        }

        EventFrames {
            rx,
            hub: Arc::downgrade(self),
            id,
            domain_filter: None,
        }
    }

    /// Delivers an event to every matching subscription.
    ///
    /// Per-subscriber order equals the order of `publish` calls, which
    /// the reader loop makes equal to transport arrival order.
    pub(crate) fn publish(&self, event: &EventFrame) {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|id, subscriber| {
            if !subscriber.matches(&event.method) {
                return true;
            }
            match subscriber.tx.send(event.clone()) {
                Ok(()) => true,
                Err(_) => {
                    trace!(%id, "Dropping stale subscription");
                    false
                }
            }
        });
    }

    /// Removes a subscription. Events already queued are dropped with
    /// the receiver.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        if self.inner.lock().subscribers.remove(&id).is_some() {
            trace!(%id, "Unsubscribed");
        }
    }

    /// Drops every subscription and rejects new ones.
    ///
    /// Invoked once, when the transport reports closure; all streams end
    /// after draining what was already queued.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        let count = inner.subscribers.len();
        inner.subscribers.clear();
        if count > 0 {
            debug!(count, "Closed event subscriptions");
        }
    }

    /// Returns the number of live subscriptions.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

// ============================================================================
// EventFrames
// ============================================================================

/// A stream of raw event envelopes.
///
/// Yields every event matching the subscription's filter, in arrival
/// order. Dropping the stream unsubscribes it.
pub struct EventFrames {
    rx: mpsc::UnboundedReceiver<EventFrame>,
    hub: Weak<EventHub>,
    id: SubscriptionId,
    /// Client-side domain restriction for domain-scoped subscriptions.
    domain_filter: Option<String>,
}

impl EventFrames {
    /// Restricts the stream to events of one domain.
    ///
    /// Used by domain wrappers that subscribe to everything and
    /// post-filter by the domain part of the method name.
    #[must_use]
    pub(crate) fn scoped_to(mut self, domain: &str) -> Self {
        self.domain_filter = Some(domain.to_owned());
        self
    }
}

impl Stream for EventFrames {
    type Item = EventFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match this.rx.poll_recv(cx) {
                Poll::Ready(Some(event)) => {
                    if let Some(domain) = &this.domain_filter
                        && event.domain() != domain
                    {
                        continue;
                    }
                    return Poll::Ready(Some(event));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for EventFrames {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}

// ============================================================================
// EventStream
// ============================================================================

/// A stream of typed events.
///
/// Each envelope's payload is decoded into `E` as it is yielded; a
/// payload that does not match the expected shape surfaces as an `Err`
/// item without ending the stream for subsequent events.
pub struct EventStream<E> {
    frames: EventFrames,
    /// Event name, kept for decode-error context.
    method: String,
    _marker: PhantomData<fn() -> E>,
}

impl<E> EventStream<E> {
    /// Wraps a raw subscription in a typed decoder.
    pub(crate) fn new(frames: EventFrames, method: &str) -> Self {
        Self {
            frames,
            method: method.to_owned(),
            _marker: PhantomData,
        }
    }

    /// Returns the event name this stream decodes.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl<E> Stream for EventStream<E>
where
    E: DeserializeOwned,
{
    type Item = Result<E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.frames).poll_next(cx) {
            Poll::Ready(Some(frame)) => {
                let decoded = serde_json::from_value(frame.take_params())
                    .map_err(|e| Error::decode(this.method.clone(), e));
                Poll::Ready(Some(decoded))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::StreamExt;
    use serde::Deserialize;
    use serde_json::json;

    fn event(method: &str, params: serde_json::Value) -> EventFrame {
        EventFrame {
            method: method.into(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn test_all_matching_subscribers_receive_every_event_in_order() {
        let hub = Arc::new(EventHub::new());
        let mut first = hub.subscribe(Some("Network.dataReceived"));
        let mut second = hub.subscribe(Some("Network.dataReceived"));

        hub.publish(&event("Network.dataReceived", json!({"seq": 1})));
        hub.publish(&event("Network.dataReceived", json!({"seq": 2})));

        for stream in [&mut first, &mut second] {
            let a = stream.next().await.expect("event");
            let b = stream.next().await.expect("event");
            assert_eq!(a.params.expect("params")["seq"], 1);
            assert_eq!(b.params.expect("params")["seq"], 2);
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_does_not_block_others() {
        let hub = Arc::new(EventHub::new());
        let mut fast = hub.subscribe(Some("Network.dataReceived"));
        let _slow = hub.subscribe(Some("Network.dataReceived"));

        // The slow stream is never polled; the fast one still drains.
        for seq in 0..100 {
            hub.publish(&event("Network.dataReceived", json!({"seq": seq})));
        }
        for seq in 0..100 {
            let frame = fast.next().await.expect("event");
            assert_eq!(frame.params.expect("params")["seq"], seq);
        }
    }

    #[tokio::test]
    async fn test_filter_excludes_other_methods() {
        let hub = Arc::new(EventHub::new());
        let mut page = hub.subscribe(Some("Page.loadEventFired"));
        let mut all = hub.subscribe(None);

        hub.publish(&event("Network.dataReceived", json!({})));
        hub.publish(&event("Page.loadEventFired", json!({"timestamp": 1.0})));

        let frame = page.next().await.expect("event");
        assert_eq!(frame.method, "Page.loadEventFired");

        // The unfiltered subscription saw both, in order.
        assert_eq!(all.next().await.expect("event").method, "Network.dataReceived");
        assert_eq!(all.next().await.expect("event").method, "Page.loadEventFired");
    }

    #[tokio::test]
    async fn test_domain_scoped_stream_post_filters() {
        let hub = Arc::new(EventHub::new());
        let mut page_events = hub.subscribe(None).scoped_to("Page");

        hub.publish(&event("Network.dataReceived", json!({})));
        hub.publish(&event("Page.frameNavigated", json!({})));

        assert_eq!(page_events.next().await.expect("event").method, "Page.frameNavigated");
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let hub = Arc::new(EventHub::new());
        let stream = hub.subscribe(Some("Page.loadEventFired"));
        assert_eq!(hub.subscriber_count(), 1);

        drop(stream);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_close_ends_streams() {
        let hub = Arc::new(EventHub::new());
        let mut stream = hub.subscribe(None);

        hub.publish(&event("Page.loadEventFired", json!({})));
        hub.close();

        // Already-queued events drain, then the stream ends.
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());

        // Subscriptions after closure end immediately.
        let mut late = hub.subscribe(None);
        assert!(late.next().await.is_none());
    }

    #[tokio::test]
    async fn test_typed_stream_surfaces_decode_errors_per_event() {
        #[derive(Debug, Deserialize)]
        struct DataReceived {
            seq: u64,
        }

        let hub = Arc::new(EventHub::new());
        let raw = hub.subscribe(Some("Network.dataReceived"));
        let mut typed: EventStream<DataReceived> = EventStream::new(raw, "Network.dataReceived");

        hub.publish(&event("Network.dataReceived", json!({"seq": "not a number"})));
        hub.publish(&event("Network.dataReceived", json!({"seq": 2})));

        let first = typed.next().await.expect("item");
        assert!(matches!(first, Err(Error::Decode { .. })));

        // The stream survives the bad payload.
        let second = typed.next().await.expect("item").expect("decode");
        assert_eq!(second.seq, 2);
    }
}
