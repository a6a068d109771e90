use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Collapses bursts of requests into one delayed action.
///
/// While an action is pending further requests are dropped. A pending action is
/// never cancelled or pushed back.
#[derive(Clone, Debug)]
pub struct CoalescingScheduler {
    delay: Duration,
    pending: Arc<AtomicBool>,
}

impl CoalescingScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Schedules `action` after the delay unless one is already pending.
    ///
    /// Returns the spawned task when this call scheduled the action.
    pub fn schedule<F>(&self, action: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pending.swap(true, Ordering::SeqCst) {
            trace!("action already pending; coalesced");
            return None;
        }
        let pending = Arc::clone(&self.pending);
        let deadline = Instant::now() + self.delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            pending.store(false, Ordering::SeqCst);
            action();
        }))
    }
}
