//! Change-notification feed abstraction.
//!
//! The tracker reacts to an abstract pub/sub transport through the
//! [`ChangeFeed`] trait: it asks for one subscription on a topic, receives
//! [`FeedEvent`]s over an mpsc channel, and releases the handle when done.
//! Byte-level reliability, wire format, and authentication are the transport's
//! problem; this crate only sees status signals and change ticks.
//!
//! # Subscription generations
//!
//! Every subscription is tagged with a monotonically increasing generation
//! number chosen by the caller. Implementations must stamp every event they
//! deliver with the generation of the subscription that produced it, so a
//! late event from an already-replaced subscription can be recognized and
//! discarded instead of corrupting the state of its successor.

use tokio::sync::mpsc;

/// Transport status signal for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The subscription is established and delivering changes.
    Connected,
    /// The transport reported an error on this subscription.
    Error,
    /// The subscription attempt or heartbeat timed out.
    TimedOut,
    /// The transport closed the subscription.
    Closed,
}

/// An event delivered on a change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// Subscription health changed.
    Status(FeedStatus),
    /// A location row changed; the current snapshot may be stale.
    Change,
}

/// A [`FeedEvent`] stamped with the generation of the subscription that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedMessage {
    pub generation: u64,
    pub event: FeedEvent,
}

impl FeedMessage {
    pub fn new(generation: u64, event: FeedEvent) -> Self {
        Self { generation, event }
    }
}

/// Change-notification subscription primitive.
///
/// Implemented by the host application on top of its realtime transport.
/// An implementation delivers events by sending [`FeedMessage`]s stamped with
/// the given `generation` on `events`; a full channel may drop change ticks
/// (the next tick re-triggers the same fetch) but should not drop status
/// signals.
pub trait ChangeFeed: Send + Sync + 'static {
    /// Opaque handle for one live subscription.
    type Handle: Send;

    /// Open a subscription on `topic`.
    fn subscribe(
        &self,
        topic: &str,
        generation: u64,
        events: mpsc::Sender<FeedMessage>,
    ) -> Self::Handle;

    /// Release a subscription handle.
    ///
    /// Must be safe to call for handles whose subscription already died on the
    /// transport side.
    fn release(&self, handle: Self::Handle);
}
