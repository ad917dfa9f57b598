//! Single-slot debounce scheduler.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Holds at most one deferred value. Scheduling a new value replaces (and so
/// cancels) whatever was pending, which makes the last write win.
///
/// Nothing runs in the background: the owner awaits [`Debouncer::fired`],
/// typically as one arm of a `tokio::select!` loop. Dropping that future
/// before it completes keeps the pending value, so it is safe to race.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with a new value, discarding any pending one.
    pub fn schedule(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.delay, value));
    }

    /// Drop the pending value, if any. Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending value's deadline and take it.
    ///
    /// Returns `None` immediately when nothing is scheduled.
    pub async fn fired(&mut self) -> Option<T> {
        let deadline = self.pending.as_ref()?.0;
        sleep_until(deadline).await;
        self.pending.take().map(|(_, value)| value)
    }
}
