//! Cancellable dwell timer keyed by a transition token.
//!
//! The timer only delivers its token; whoever receives it decides whether the
//! token is still the expected one. Cancelling aborts the sleeping task, so a
//! cancelled timer never fires.

use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct DwellTimer {
    token: Option<u64>,
    handle: Option<JoinHandle<()>>,
}

impl DwellTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, replacing any previous one. `on_fire` runs with
    /// `token` once `delay` has elapsed.
    pub fn schedule<F>(&mut self, token: u64, delay: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.token = Some(token);
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(token);
        }));
    }

    /// Disarms the timer. The pending action, if any, is dropped.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.token = None;
    }

    /// Forgets a timer that already fired.
    pub fn clear(&mut self) {
        self.handle = None;
        self.token = None;
    }

    pub fn token(&self) -> Option<u64> {
        self.token
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for DwellTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
