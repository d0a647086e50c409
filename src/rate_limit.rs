//! Request rate limiting
//!
//! Token bucket limiter shared by the batch workers so a large site list
//! does not hammer remote servers. A rate of 0 disables limiting.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Token bucket limiting the number of requests started per second.
///
/// The bucket holds one second's worth of tokens, so a fresh limiter
/// absorbs a burst before throttling kicks in.
#[derive(Debug)]
pub struct RateLimiter {
    tokens: f64,
    capacity: f64,
    /// Tokens added per second.
    refill_rate: f64,
    last_refill: Instant,
    enabled: bool,
}

impl RateLimiter {
    /// `requests_per_second` of 0 turns the limiter off entirely.
    pub fn new(requests_per_second: u32) -> Self {
        let enabled = requests_per_second > 0;
        let capacity = if enabled {
            f64::from(requests_per_second)
        } else {
            f64::INFINITY
        };

        Self {
            tokens: capacity,
            capacity,
            refill_rate: f64::from(requests_per_second),
            last_refill: Instant::now(),
            enabled,
        }
    }

    fn refill(&mut self) {
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take a token if one is available, otherwise report how long until
    /// the next one lands.
    pub fn try_acquire(&mut self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }

        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let deficit = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(deficit / self.refill_rate))
        }
    }
}

/// Shared handle used by the batch workers.
#[derive(Debug, Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<RateLimiter>>,
}

impl SharedRateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiter::new(requests_per_second))),
        }
    }

    /// Acquire a token, sleeping until one becomes available.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut limiter = self.inner.lock().await;
                limiter.try_acquire()
            };
            match wait {
                None => return,
                Some(duration) => {
                    debug!("Rate limited, waiting {:?}", duration);
                    sleep(duration).await;
                }
            }
        }
    }
}
