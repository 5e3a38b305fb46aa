//! Fetch throttle gate.
//!
//! Change notifications can arrive far faster than the console needs fresh
//! data, so the supervisor pushes every notification-triggered fetch through
//! a [`ThrottleGate`]: a trigger landing within the minimum interval of the
//! last accepted one is dropped outright, never queued. The next notification
//! re-triggers the same fetch, so nothing is lost.
//!
//! The gate is a field on the tracker instance, never process-wide state, so
//! two independent map views never steal each other's fetch budget.

use std::time::Duration;
use tokio::time::Instant;

/// Per-instance fetch rate limiter.
#[derive(Debug)]
pub struct ThrottleGate {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl ThrottleGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: None,
        }
    }

    /// Accept or drop a trigger.
    ///
    /// The first trigger after construction or [`reset`](Self::reset) always
    /// passes; afterwards a trigger passes only if `min_interval` has elapsed
    /// since the last accepted one. Accepting records the trigger time.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        match self.last_accepted {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }

    /// Record a fetch that bypasses the gate (debounced parameter change or
    /// manual refetch) so subsequent notification triggers still back off.
    pub fn record(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }

    /// Forget history; the next trigger will pass unconditionally.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_SECS: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn test_first_trigger_always_passes() {
        let mut gate = ThrottleGate::new(FIVE_SECS);
        assert!(gate.try_accept(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_within_interval_is_dropped() {
        let mut gate = ThrottleGate::new(FIVE_SECS);
        assert!(gate.try_accept(Instant::now()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!gate.try_accept(Instant::now()));

        // Dropped triggers are not queued: still dropped just before the edge
        tokio::time::advance(Duration::from_millis(2990)).await;
        assert!(!gate.try_accept(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_after_interval_passes() {
        let mut gate = ThrottleGate::new(FIVE_SECS);
        assert!(gate.try_accept(Instant::now()));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(gate.try_accept(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_pushes_back_next_acceptance() {
        let mut gate = ThrottleGate::new(FIVE_SECS);
        assert!(gate.try_accept(Instant::now()));

        tokio::time::advance(Duration::from_secs(4)).await;
        gate.record(Instant::now()); // bypassing fetch at t=4s

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(!gate.try_accept(Instant::now()), "only 3s since the bypass");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(gate.try_accept(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_forgets_history() {
        let mut gate = ThrottleGate::new(FIVE_SECS);
        assert!(gate.try_accept(Instant::now()));
        gate.reset();
        assert!(gate.try_accept(Instant::now()), "reset re-arms the first-call pass");
    }
}
