//! Single-slot auto-dismiss timer.

use crate::config::duration_ms;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

// Stand-in deadline for delays too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

struct PendingDismiss {
    handle: JoinHandle<()>,
    generation: u64,
}

/// Owns at most one pending auto-dismiss timer.
///
/// Every armed timer is tagged with a generation. When a timer fires it
/// reports its generation back through [`NotificationScheduler::complete`],
/// which only accepts the most recent one. A timer that was cancelled but
/// had already woken up is therefore a no-op.
///
/// Dropping the scheduler aborts the pending timer.
#[derive(Default)]
pub struct NotificationScheduler {
    pending: Option<PendingDismiss>,
    generation: u64,
}

impl NotificationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer that calls `on_fire` with its generation after `delay`.
    ///
    /// The deadline is fixed when `arm` is called, not when the timer task
    /// is first polled. Any timer still pending is cancelled first. Must be
    /// called from within a Tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or(now + FAR_FUTURE);

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire(generation);
        });
        debug!(generation, delay_ms = duration_ms(delay), "auto-dismiss armed");

        self.pending = Some(PendingDismiss { handle, generation });
        generation
    }

    /// Abort the pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.handle.abort();
                debug!(generation = pending.generation, "auto-dismiss cancelled");
                true
            }
            None => false,
        }
    }

    /// Accept a fired timer. Returns `false` for a stale generation.
    pub fn complete(&mut self, generation: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending = None;
                true
            }
            _ => {
                debug!(generation, "ignoring stale auto-dismiss");
                false
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Generation of the most recently armed timer (0 before the first).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for NotificationScheduler {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
