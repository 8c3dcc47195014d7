use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

const PAUSE_POLL: Duration = Duration::from_millis(500);

/// Cooperative pause and cancel flags shared between a batch worker and
/// its controller. The worker checks them only between documents.
#[derive(Debug, Default)]
pub struct BatchControl {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.set_paused(true);
    }

    pub fn resume(&self) {
        self.set_paused(false);
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&self) -> bool {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        *paused = !*paused;
        self.resumed.notify_all();
        *paused
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks while paused. Returns `false` if the batch was cancelled
    /// before or during the wait.
    pub fn wait_while_paused(&self) -> bool {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        while *paused && !self.is_cancelled() {
            let (guard, _) = self
                .resumed
                .wait_timeout(paused, PAUSE_POLL)
                .unwrap_or_else(PoisonError::into_inner);
            paused = guard;
        }
        !self.is_cancelled()
    }

    fn set_paused(&self, value: bool) {
        let mut paused = self.paused.lock().unwrap_or_else(PoisonError::into_inner);
        *paused = value;
        self.resumed.notify_all();
    }
}
