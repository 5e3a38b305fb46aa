//! Tracker facade and supervisor loop.
//!
//! [`ResponderTracker`] composes the tiered fetcher, the connection state
//! machine, the throttle/debounce gate, and the lifecycle guard into one
//! supervisor task. All mutable state lives inside that task; the caller
//! talks to it through a [`TrackerHandle`] and observes it through a `watch`
//! channel, so "concurrency" here is interleaved callbacks on one event loop,
//! never shared-state races.
//!
//! # Lifecycle guard
//!
//! Teardown flips a [`CancellationToken`] exactly once. The supervisor loop
//! observes it and exits, which synchronously dies with its retry and
//! debounce deadlines; in-flight fetch tasks are not aborted at the transport
//! level, but they re-check the token before reporting and their result
//! channel closes with the loop, so no completion can mutate state after
//! teardown. Live [`SearchParams`] sit in a [`ParamCell`] read at resolution
//! time, never captured at subscription setup.
//!
//! # Fetch generations
//!
//! Every issued fetch carries a monotonically increasing generation number
//! and only the latest generation's completion is applied. Without this, a
//! slow early fetch could resolve after - and silently overwrite - a fresher
//! snapshot, since each completion replaces the whole set.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::feed::{ChangeFeed, FeedEvent, FeedMessage};
use crate::geo::OperatingBoundary;
use crate::session::SessionAccess;
use crate::source::{FetchOutcome, LocationBackend, TieredFetcher};

use super::config::TrackerConfig;
use super::connection::{ConnectionSupervisor, Transition};
use super::error::TrackerError;
use super::gate::ThrottleGate;
use super::handle::{Command, TrackerHandle};
use super::state::{ConnectionState, ParamCell, ResponderLocation, TrackerSnapshot};

/// Facade over the live responder-position subsystem.
///
/// # Usage
///
/// ```ignore
/// use fieldtrack::tracker::{ResponderTracker, TrackerConfig};
///
/// let config = TrackerConfig::new(center);
/// let handle = ResponderTracker::new(backend, feed, session, boundary, config).start();
///
/// let mut snapshots = handle.subscribe();
/// while snapshots.changed().await.is_ok() {
///     let view = snapshots.borrow().clone();
///     render(view.responders, view.connection_status);
/// }
/// ```
pub struct ResponderTracker<B, F: ChangeFeed, S> {
    backend: Arc<B>,
    feed: Arc<F>,
    session: Arc<S>,
    boundary: OperatingBoundary,
    config: TrackerConfig,
}

impl<B, F, S> ResponderTracker<B, F, S>
where
    B: LocationBackend + 'static,
    F: ChangeFeed,
    S: SessionAccess + 'static,
{
    pub fn new(
        backend: Arc<B>,
        feed: Arc<F>,
        session: Arc<S>,
        boundary: OperatingBoundary,
        config: TrackerConfig,
    ) -> Self {
        Self {
            backend,
            feed,
            session,
            boundary,
            config,
        }
    }

    /// Spawn the supervisor task and return the caller-side handle.
    pub fn start(self) -> TrackerHandle {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let (feed_tx, feed_rx) = mpsc::channel(64);
        let (fetch_tx, fetch_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) =
            watch::channel(TrackerSnapshot::initial(self.config.enabled));
        let cancel = CancellationToken::new();

        let params = ParamCell::new(self.config.initial_params());
        let fetcher = TieredFetcher::new(
            Arc::clone(&self.backend),
            self.boundary,
            params.clone(),
            self.config.restricted_fetch_timeout,
        );
        let connection = ConnectionSupervisor::new(
            Arc::clone(&self.feed),
            self.config.topic.clone(),
            feed_tx,
            self.config.reconnect_attempts,
            self.config.reconnect_interval,
        );

        let supervisor = Supervisor {
            fetcher,
            session: self.session,
            connection,
            params,
            gate: ThrottleGate::new(self.config.fetch_throttle),
            debounce: self.config.param_debounce,
            debounce_deadline: None,
            fetch_generation: 0,
            fetch_tx,
            responders: Vec::new(),
            loading: false,
            error: None,
            snapshot_tx,
            cancel: cancel.clone(),
        };

        let task = tokio::spawn(supervisor.run(commands_rx, feed_rx, fetch_rx));

        TrackerHandle {
            commands: commands_tx,
            snapshot_rx,
            cancel,
            task,
        }
    }
}

/// The supervisor task's state. Exclusively owned by its event loop.
struct Supervisor<B, F: ChangeFeed, S> {
    fetcher: TieredFetcher<B>,
    session: Arc<S>,
    connection: ConnectionSupervisor<F>,
    params: ParamCell,
    gate: ThrottleGate,
    debounce: std::time::Duration,
    debounce_deadline: Option<Instant>,
    fetch_generation: u64,
    fetch_tx: mpsc::Sender<(u64, FetchOutcome)>,
    responders: Vec<ResponderLocation>,
    loading: bool,
    error: Option<String>,
    snapshot_tx: watch::Sender<TrackerSnapshot>,
    cancel: CancellationToken,
}

impl<B, F, S> Supervisor<B, F, S>
where
    B: LocationBackend + 'static,
    F: ChangeFeed,
    S: SessionAccess + 'static,
{
    async fn run(
        mut self,
        mut commands_rx: mpsc::Receiver<Command>,
        mut feed_rx: mpsc::Receiver<FeedMessage>,
        mut fetch_rx: mpsc::Receiver<(u64, FetchOutcome)>,
    ) {
        tracing::info!("responder tracker started");
        let cancel = self.cancel.clone();

        if self.params.get().enabled {
            self.arm();
        } else {
            self.publish();
        }

        loop {
            let retry_at = self.connection.retry_deadline();
            let debounce_at = self.debounce_deadline;

            tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands_rx.recv() => match command {
                    Some(Command::Refetch) => self.forced_fetch("manual refetch"),
                    Some(Command::Reconnect) => self.handle_reconnect(),
                    Some(Command::UpdateParams(params)) => self.handle_params(params),
                    // Handle dropped without an explicit shutdown
                    None => break,
                },
                Some(message) = feed_rx.recv() => self.handle_feed(message),
                Some((generation, outcome)) = fetch_rx.recv() => {
                    self.handle_fetch(generation, outcome);
                }
                _ = tokio::time::sleep_until(retry_at.unwrap_or_else(Instant::now)),
                    if retry_at.is_some() =>
                {
                    self.connection.retry_due();
                    self.publish();
                }
                _ = tokio::time::sleep_until(debounce_at.unwrap_or_else(Instant::now)),
                    if debounce_at.is_some() =>
                {
                    self.debounce_deadline = None;
                    self.forced_fetch("parameter change");
                }
            }
        }

        self.teardown();
        tracing::info!("responder tracker stopped");
    }

    /// Enable flow: one immediate fetch, then the change subscription.
    fn arm(&mut self) {
        self.gate.reset();
        self.error = None;
        if self.gate.try_accept(Instant::now()) {
            self.start_fetch("enable");
        }
        self.connection.open();
        self.publish();
    }

    /// Disable flow: release the subscription, clear timers and state.
    fn disarm(&mut self) {
        self.connection.close();
        self.debounce_deadline = None;
        self.responders.clear();
        self.loading = false;
        self.error = None;
        self.publish();
    }

    fn teardown(&mut self) {
        self.connection.close();
        self.debounce_deadline = None;
        self.responders.clear();
        self.loading = false;
        self.publish();
    }

    fn handle_reconnect(&mut self) {
        if !self.params.get().enabled {
            return;
        }
        self.error = None;
        self.connection.reconnect();
        self.publish();
    }

    fn handle_params(&mut self, params: super::state::SearchParams) {
        let previous = self.params.get();
        self.params.set(params);

        if previous.enabled && !params.enabled {
            tracing::info!("tracking disabled");
            self.disarm();
        } else if !previous.enabled && params.enabled {
            tracing::info!("tracking enabled");
            self.arm();
        } else if params.enabled
            && (params.center != previous.center || params.radius_km != previous.radius_km)
        {
            // Trailing debounce: each change restarts the window, so a burst
            // of map pans collapses into one fetch with the final values
            self.debounce_deadline = Some(Instant::now() + self.debounce);
            tracing::debug!(
                center = %params.center,
                radius_km = params.radius_km,
                "parameter change debounced"
            );
        }
    }

    fn handle_feed(&mut self, message: FeedMessage) {
        if !self.connection.is_current(message.generation) {
            tracing::trace!(
                generation = message.generation,
                "ignoring event from replaced subscription"
            );
            return;
        }

        match message.event {
            FeedEvent::Change => self.throttled_fetch(),
            FeedEvent::Status(signal) => {
                match self.connection.apply_status(signal, Instant::now()) {
                    Transition::Connected => {
                        self.error = None;
                    }
                    Transition::RetryScheduled { .. } | Transition::Closed => {}
                    Transition::Lost { attempts } => {
                        self.error = Some(TrackerError::ConnectionLost { attempts }.to_string());
                    }
                }
                self.publish();
            }
        }
    }

    /// A change tick: fetch unless the gate says we fetched too recently.
    fn throttled_fetch(&mut self) {
        if self.gate.try_accept(Instant::now()) {
            self.start_fetch("change notification");
        } else {
            tracing::debug!("change notification dropped by throttle gate");
        }
    }

    /// A fetch that bypasses the gate but still records into it.
    fn forced_fetch(&mut self, reason: &'static str) {
        self.gate.record(Instant::now());
        self.start_fetch(reason);
    }

    fn start_fetch(&mut self, reason: &'static str) {
        if !self.params.get().enabled {
            return;
        }

        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        self.loading = true;
        self.publish();

        let fetcher = self.fetcher.clone();
        let role = self.session.current_role();
        let fetch_tx = self.fetch_tx.clone();
        let cancel = self.cancel.clone();
        tracing::debug!(generation, reason, %role, "starting location fetch");

        tokio::spawn(async move {
            let outcome = fetcher.fetch(role).await;
            // Liveness check: a completion landing after teardown reports
            // nothing and mutates nothing
            if cancel.is_cancelled() {
                return;
            }
            let _ = fetch_tx.send((generation, outcome)).await;
        });
    }

    fn handle_fetch(&mut self, generation: u64, outcome: FetchOutcome) {
        if generation != self.fetch_generation {
            tracing::debug!(
                generation,
                current = self.fetch_generation,
                "discarding stale fetch result"
            );
            return;
        }

        self.loading = false;
        match outcome {
            FetchOutcome::Snapshot(set) => {
                tracing::debug!(generation, responders = set.len(), "snapshot applied");
                self.responders = set;
                self.error = None;
            }
            FetchOutcome::Degraded => {
                self.responders.clear();
                self.error = None;
            }
            FetchOutcome::Failed(error) => {
                // Fail closed: stale data is never presented as current
                self.responders.clear();
                self.error = Some(TrackerError::Fetch(error).to_string());
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = TrackerSnapshot {
            responders: self.responders.clone(),
            is_connected: self.connection.status() == ConnectionState::Connected,
            is_loading: self.loading,
            error: self.error.clone(),
            connection_status: self.connection.status(),
        };
        let _ = self.snapshot_tx.send(snapshot);
    }
}
