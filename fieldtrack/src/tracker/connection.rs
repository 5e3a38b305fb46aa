//! Connection state machine for the single change subscription.
//!
//! [`ConnectionSupervisor`] exclusively owns the subscription handle; no
//! other component opens or closes it. It maps transport status signals to
//! [`ConnectionState`] and runs bounded-retry reconnection at a fixed
//! interval.
//!
//! # State machine
//!
//! ```text
//! Connecting --[Connected signal]--> Connected
//! Connected --[Error/TimedOut, budget remains]--> Reconnecting
//! Reconnecting --[retry deadline fires]--> Connecting
//! any --[budget spent]--> Disconnected (terminal until reconnect())
//! Connected --[Closed signal]--> Disconnected
//! ```
//!
//! # Subscription generations
//!
//! Every `open()` bumps a generation counter and tags the new subscription
//! with it. The previous handle is always fully released first, so at most
//! one subscription is ever current; events stamped with an older generation
//! are recognized via [`is_current`](ConnectionSupervisor::is_current) and
//! dropped by the supervisor loop, preventing cross-talk between overlapping
//! subscription generations during reconnects.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::feed::{ChangeFeed, FeedMessage, FeedStatus};

use super::state::ConnectionState;

/// What a status signal did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Subscription established; retry counter and error cleared.
    Connected,
    /// Transport failure within budget; `open()` scheduled after the fixed
    /// interval.
    RetryScheduled { attempt: u32 },
    /// Retry budget spent; the connection is down until a manual
    /// `reconnect()`.
    Lost { attempts: u32 },
    /// The transport closed the subscription.
    Closed,
}

/// Owns the single change subscription and its health.
pub struct ConnectionSupervisor<F: ChangeFeed> {
    feed: Arc<F>,
    topic: String,
    events_tx: mpsc::Sender<FeedMessage>,
    handle: Option<F::Handle>,
    generation: u64,
    status: ConnectionState,
    attempts: u32,
    max_attempts: u32,
    retry_interval: Duration,
    retry_deadline: Option<Instant>,
}

impl<F: ChangeFeed> ConnectionSupervisor<F> {
    pub fn new(
        feed: Arc<F>,
        topic: String,
        events_tx: mpsc::Sender<FeedMessage>,
        max_attempts: u32,
        retry_interval: Duration,
    ) -> Self {
        Self {
            feed,
            topic,
            events_tx,
            handle: None,
            generation: 0,
            status: ConnectionState::Disconnected,
            attempts: 0,
            max_attempts,
            retry_interval,
            retry_deadline: None,
        }
    }

    pub fn status(&self) -> ConnectionState {
        self.status
    }

    /// Deadline of the pending retry, if one is scheduled.
    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_deadline
    }

    /// True if `generation` tags the currently live subscription.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    /// Open the subscription.
    ///
    /// Idempotent: any existing handle is fully released before the new
    /// subscription is requested under a fresh generation tag.
    pub fn open(&mut self) {
        self.release_handle();
        self.retry_deadline = None;
        self.generation += 1;
        self.status = ConnectionState::Connecting;

        tracing::debug!(
            topic = %self.topic,
            generation = self.generation,
            "opening change subscription"
        );
        let handle = self
            .feed
            .subscribe(&self.topic, self.generation, self.events_tx.clone());
        self.handle = Some(handle);
    }

    /// Cancel any pending retry, release the active handle, and forget the
    /// retry history. A later `open()` starts with a full budget; terminal
    /// loss keeps its count because it releases the handle directly.
    ///
    /// Safe to call repeatedly; the handle is released exactly once.
    pub fn close(&mut self) {
        self.retry_deadline = None;
        self.attempts = 0;
        self.release_handle();
        self.status = ConnectionState::Disconnected;
    }

    /// Manual recovery: reset the retry counter and open immediately,
    /// bypassing any scheduled backoff.
    pub fn reconnect(&mut self) {
        tracing::info!(topic = %self.topic, "manual reconnect requested");
        self.attempts = 0;
        self.open();
    }

    /// The scheduled retry deadline fired.
    pub fn retry_due(&mut self) {
        self.retry_deadline = None;
        tracing::info!(
            topic = %self.topic,
            attempt = self.attempts,
            "retrying change subscription"
        );
        self.open();
    }

    /// Apply a transport status signal from the current subscription.
    pub fn apply_status(&mut self, signal: FeedStatus, now: Instant) -> Transition {
        match signal {
            FeedStatus::Connected => {
                self.status = ConnectionState::Connected;
                self.attempts = 0;
                self.retry_deadline = None;
                tracing::info!(topic = %self.topic, generation = self.generation, "change subscription connected");
                Transition::Connected
            }
            FeedStatus::Error | FeedStatus::TimedOut => {
                self.attempts += 1;
                if self.attempts >= self.max_attempts {
                    self.status = ConnectionState::Disconnected;
                    self.retry_deadline = None;
                    self.release_handle();
                    tracing::warn!(
                        topic = %self.topic,
                        attempts = self.attempts,
                        "retry budget spent, change subscription lost"
                    );
                    Transition::Lost {
                        attempts: self.attempts,
                    }
                } else {
                    self.status = ConnectionState::Reconnecting;
                    self.retry_deadline = Some(now + self.retry_interval);
                    tracing::warn!(
                        topic = %self.topic,
                        attempt = self.attempts,
                        retry_in_secs = self.retry_interval.as_secs_f64(),
                        "change subscription failed, retry scheduled"
                    );
                    Transition::RetryScheduled {
                        attempt: self.attempts,
                    }
                }
            }
            FeedStatus::Closed => {
                self.status = ConnectionState::Disconnected;
                self.retry_deadline = None;
                self.release_handle();
                tracing::info!(topic = %self.topic, "change subscription closed by transport");
                Transition::Closed
            }
        }
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::debug!(
                topic = %self.topic,
                generation = self.generation,
                "releasing change subscription handle"
            );
            self.feed.release(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts subscribes and releases; handles are the generation tags.
    #[derive(Default)]
    struct CountingFeed {
        subscribed: AtomicUsize,
        released: AtomicUsize,
    }

    impl ChangeFeed for CountingFeed {
        type Handle = u64;

        fn subscribe(
            &self,
            _topic: &str,
            generation: u64,
            _events: mpsc::Sender<FeedMessage>,
        ) -> u64 {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            generation
        }

        fn release(&self, _handle: u64) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn supervisor(
        max_attempts: u32,
    ) -> (Arc<CountingFeed>, ConnectionSupervisor<CountingFeed>) {
        let feed = Arc::new(CountingFeed::default());
        let (events_tx, _events_rx) = mpsc::channel(16);
        let supervisor = ConnectionSupervisor::new(
            Arc::clone(&feed),
            "responder-locations".to_string(),
            events_tx,
            max_attempts,
            Duration::from_secs(3),
        );
        (feed, supervisor)
    }

    #[tokio::test]
    async fn test_open_then_connected() {
        let (_feed, mut sup) = supervisor(5);
        assert_eq!(sup.status(), ConnectionState::Disconnected);

        sup.open();
        assert_eq!(sup.status(), ConnectionState::Connecting);
        assert!(sup.is_current(1));

        let t = sup.apply_status(FeedStatus::Connected, Instant::now());
        assert_eq!(t, Transition::Connected);
        assert_eq!(sup.status(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_reopen_releases_previous_handle_first() {
        let (feed, mut sup) = supervisor(5);
        sup.open();
        sup.open();

        assert_eq!(feed.subscribed.load(Ordering::SeqCst), 2);
        assert_eq!(feed.released.load(Ordering::SeqCst), 1);
        assert!(!sup.is_current(1), "generation 1 replaced");
        assert!(sup.is_current(2));
    }

    #[tokio::test]
    async fn test_error_schedules_retry_within_budget() {
        let (_feed, mut sup) = supervisor(5);
        sup.open();
        let now = Instant::now();

        let t = sup.apply_status(FeedStatus::Error, now);
        assert_eq!(t, Transition::RetryScheduled { attempt: 1 });
        assert_eq!(sup.status(), ConnectionState::Reconnecting);
        assert_eq!(sup.retry_deadline(), Some(now + Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_terminal() {
        let (feed, mut sup) = supervisor(3);
        sup.open();

        for _ in 0..2 {
            let t = sup.apply_status(FeedStatus::Error, Instant::now());
            assert!(matches!(t, Transition::RetryScheduled { .. }));
            sup.retry_due();
        }

        let t = sup.apply_status(FeedStatus::TimedOut, Instant::now());
        assert_eq!(t, Transition::Lost { attempts: 3 });
        assert_eq!(sup.status(), ConnectionState::Disconnected);
        assert!(sup.retry_deadline().is_none());
        // Terminal loss releases the dead handle
        assert_eq!(
            feed.subscribed.load(Ordering::SeqCst),
            feed.released.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_close_resets_retry_counter() {
        let (_feed, mut sup) = supervisor(3);
        sup.open();

        // Nearly spend the budget, then tear down and reopen
        for _ in 0..2 {
            sup.apply_status(FeedStatus::Error, Instant::now());
            sup.retry_due();
        }
        sup.close();
        sup.open();

        // The fresh subscription has a full budget again: an early error
        // schedules a retry instead of going terminal
        let t = sup.apply_status(FeedStatus::Error, Instant::now());
        assert_eq!(t, Transition::RetryScheduled { attempt: 1 });
        assert_eq!(sup.status(), ConnectionState::Reconnecting);
    }

    #[tokio::test]
    async fn test_connected_resets_retry_counter() {
        let (_feed, mut sup) = supervisor(3);
        sup.open();

        sup.apply_status(FeedStatus::Error, Instant::now());
        sup.retry_due();
        sup.apply_status(FeedStatus::Connected, Instant::now());

        // Counter reset: the budget is full again
        for _ in 0..2 {
            let t = sup.apply_status(FeedStatus::Error, Instant::now());
            assert!(matches!(t, Transition::RetryScheduled { .. }));
            sup.retry_due();
        }
    }

    #[tokio::test]
    async fn test_manual_reconnect_resets_counter_and_reopens() {
        let (_feed, mut sup) = supervisor(2);
        sup.open();

        sup.apply_status(FeedStatus::Error, Instant::now());
        sup.retry_due();
        let t = sup.apply_status(FeedStatus::Error, Instant::now());
        assert_eq!(t, Transition::Lost { attempts: 2 });

        sup.reconnect();
        assert_eq!(sup.status(), ConnectionState::Connecting);
        // Fresh budget after manual reconnect
        let t = sup.apply_status(FeedStatus::Error, Instant::now());
        assert_eq!(t, Transition::RetryScheduled { attempt: 1 });
    }

    #[tokio::test]
    async fn test_close_is_repeatable_and_releases_once() {
        let (feed, mut sup) = supervisor(5);
        sup.open();

        sup.close();
        sup.close();

        assert_eq!(feed.released.load(Ordering::SeqCst), 1);
        assert_eq!(sup.status(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_close_cancels_pending_retry() {
        let (_feed, mut sup) = supervisor(5);
        sup.open();
        sup.apply_status(FeedStatus::Error, Instant::now());
        assert!(sup.retry_deadline().is_some());

        sup.close();
        assert!(sup.retry_deadline().is_none());
    }

    #[tokio::test]
    async fn test_transport_close_signal_disconnects() {
        let (feed, mut sup) = supervisor(5);
        sup.open();
        sup.apply_status(FeedStatus::Connected, Instant::now());

        let t = sup.apply_status(FeedStatus::Closed, Instant::now());
        assert_eq!(t, Transition::Closed);
        assert_eq!(sup.status(), ConnectionState::Disconnected);
        assert_eq!(feed.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_generation_not_current() {
        let (_feed, mut sup) = supervisor(5);
        sup.open(); // generation 1
        sup.open(); // generation 2
        assert!(!sup.is_current(1));
        assert!(sup.is_current(2));

        sup.close();
        assert!(!sup.is_current(2), "nothing is current after close");
    }
}
