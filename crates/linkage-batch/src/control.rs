//! Cooperative cancellation and pause for a running job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Shared {
    cancel_flag: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

/// Handle shared between the thread running a job and whoever controls it.
///
/// Requests take effect at the next chunk boundary.
#[derive(Clone, Default)]
pub struct JobControl {
    shared: Arc<Shared>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Also releases a paused job.
    pub fn cancel(&self) {
        self.shared.cancel_flag.store(true, Ordering::SeqCst);
        let _paused = self.paused_guard();
        self.shared.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel_flag.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        *self.paused_guard() = true;
    }

    pub fn resume(&self) {
        *self.paused_guard() = false;
        self.shared.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        *self.paused_guard()
    }

    /// Block while paused. Returns `false` when woken by cancellation.
    pub fn wait_while_paused(&self) -> bool {
        let guard = self.paused_guard();
        let _guard = self
            .shared
            .resumed
            .wait_while(guard, |paused| *paused && !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        !self.is_cancelled()
    }

    fn paused_guard(&self) -> MutexGuard<'_, bool> {
        self.shared
            .paused
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for JobControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobControl")
            .field("is_cancelled", &self.is_cancelled())
            .field("is_paused", &self.is_paused())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn resume_releases_a_waiting_thread() {
        let control = JobControl::new();
        control.pause();
        let waiter = {
            let control = control.clone();
            thread::spawn(move || control.wait_while_paused())
        };
        thread::sleep(Duration::from_millis(20));
        control.resume();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn cancel_releases_a_paused_thread() {
        let control = JobControl::new();
        control.pause();
        let waiter = {
            let control = control.clone();
            thread::spawn(move || control.wait_while_paused())
        };
        control.cancel();
        assert!(!waiter.join().unwrap());
        assert!(control.is_cancelled());
    }

    #[test]
    fn unpaused_wait_returns_immediately() {
        assert!(JobControl::new().wait_while_paused());
    }
}
