//! Minimum spacing between outbound requests.
//!
//! NCBI asks unauthenticated clients to stay under 3 requests/second, so
//! [`RateLimiter::acquire`] blocks until at least `min_interval` has passed
//! since the previous acquisition. The first acquisition never waits.
//!
//! Time is read through a [`Clock`] so tests can observe the requested
//! waits without sleeping.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default spacing for 3 requests/second
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(334);

/// Source of time for [`RateLimiter`].
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Enforces a minimum interval between consecutive calls.
pub struct RateLimiter {
    min_interval: Duration,
    clock: Box<dyn Clock>,
    /// `None` until the first acquisition
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self::with_clock(min_interval, Box::new(SystemClock))
    }

    pub fn with_clock(min_interval: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            min_interval,
            clock,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until a request may be issued, then record it.
    ///
    /// Returns how long the caller was held back.
    pub fn acquire(&self) -> Duration {
        let mut last_call = self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let waited = match *last_call {
            Some(prev) => {
                let elapsed = self.clock.now().saturating_duration_since(prev);
                let wait = self.min_interval.saturating_sub(elapsed);
                if !wait.is_zero() {
                    log::debug!("rate limit: waiting {wait:?}");
                    self.clock.sleep(wait);
                }
                wait
            }
            None => Duration::ZERO,
        };

        *last_call = Some(self.clock.now());
        waited
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}
