use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

/// Caps calls to the quote provider.
///
/// Free quote API tiers allow only a handful of requests per minute
/// (Alpha Vantage 5/min, Twelve Data 8/min), and a portfolio view fires one
/// request per position.
pub struct RateLimiter {
    /// Limits in-flight requests
    semaphore: Arc<Semaphore>,
    /// When the last request was let through
    last_request: Arc<Mutex<Instant>>,
    /// Minimum spacing between requests, zero when unlimited
    min_delay: Duration,
}

impl RateLimiter {
    /// * `max_concurrent` - maximum number of in-flight requests
    /// * `requests_per_minute` - 0 disables spacing
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay = if requests_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(60_000 / requests_per_minute as u64)
        };
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(Instant::now() - Duration::from_secs(60))),
            min_delay,
        }
    }

    /// Wait for a free slot and for the minimum spacing to pass.
    ///
    /// The slot is released when the returned guard is dropped.
    pub async fn acquire(&self) -> RateLimitGuard {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("rate limiter semaphore is never closed");

        if !self.min_delay.is_zero() {
            // Reserve the next slot under the lock, sleep outside it
            let wait_until = {
                let mut last = self.last_request.lock();
                let next = (*last + self.min_delay).max(Instant::now());
                *last = next;
                next
            };
            if wait_until > Instant::now() {
                sleep(wait_until - Instant::now()).await;
            }
        }

        RateLimitGuard { _permit: permit }
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Holds a rate limit slot until dropped.
pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
