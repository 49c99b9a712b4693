use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Minimum spacing between outbound lookup attempts, shared process-wide.
/// The budget is global: retries and later candidates all draw from the same
/// schedule. Clones share state, so a concurrent limiter can replace this
/// without changing the client.
#[derive(Clone)]
pub struct RequestThrottle {
    interval: Duration,
    next_allowed: Arc<Mutex<Instant>>,
}

impl RequestThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_allowed: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Wait for the next request slot and consume it.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let sleep_for = {
            let mut next_allowed = self.next_allowed.lock().await;
            let now = Instant::now();
            let wait_until = if now >= *next_allowed { now } else { *next_allowed };
            *next_allowed = wait_until + self.interval;
            wait_until.saturating_duration_since(now)
        };

        if !sleep_for.is_zero() {
            tokio::time::sleep(sleep_for).await;
        }
    }
}
