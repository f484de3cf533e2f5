//! Request pacing shared by every call of one client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Keeps at least `cooldown` between two requests and counts them.
/// A zero cooldown never waits.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
    issued: Arc<AtomicU64>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            next_slot: Arc::new(Mutex::new(None)),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Blocks until the next request may go out and reserves the slot after it.
    pub async fn hit(&self) {
        let mut slot = self.next_slot.lock().await;
        if let Some(ready_at) = *slot {
            sleep_until(ready_at).await;
        }
        *slot = Some(Instant::now() + self.cooldown);
        self.issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Requests let through so far, across all clones.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}
