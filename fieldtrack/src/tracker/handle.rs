//! Caller-side handle for a running tracker.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::{SearchParams, TrackerSnapshot};

/// Commands the caller can send to the supervisor loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Command {
    /// Force a fetch now, bypassing the throttle gate.
    Refetch,
    /// Reset the retry counter and reopen the subscription immediately.
    Reconnect,
    /// Replace the live search parameters.
    UpdateParams(SearchParams),
}

/// Handle to a running [`ResponderTracker`](super::ResponderTracker).
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// tears the tracker down: the supervisor observes the closed command channel
/// and releases its subscription and timers.
pub struct TrackerHandle {
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) snapshot_rx: watch::Receiver<TrackerSnapshot>,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

impl TrackerHandle {
    /// The most recently published snapshot.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Force a fetch now, bypassing the throttle gate.
    pub async fn refetch(&self) {
        let _ = self.commands.send(Command::Refetch).await;
    }

    /// Reset the retry counter and reopen the subscription immediately.
    pub async fn reconnect(&self) {
        let _ = self.commands.send(Command::Reconnect).await;
    }

    /// Replace the live search parameters.
    ///
    /// Center/radius changes are debounced into one fetch; flipping
    /// `enabled` tears the subscription down or arms the tracker again.
    pub async fn update_params(&self, params: SearchParams) {
        let _ = self.commands.send(Command::UpdateParams(params)).await;
    }

    /// Tear the tracker down and wait for the supervisor to finish.
    ///
    /// Cancellation is signalled synchronously; pending retry and debounce
    /// timers die with the supervisor loop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}
