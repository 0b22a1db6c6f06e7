//! Rate limiter for Kalshi API reads.
//!
//! Basic tier allows 20 reads/sec; this client never writes.

use governor::{Quota, RateLimiter as GovLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Read-bucket limiter shared across client clones.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limiter: Arc<
        GovLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl RateLimiter {
    /// Create with the Kalshi basic-tier read limit.
    pub fn new() -> Self {
        Self::with_limit(20)
    }

    /// Create with a custom per-second read limit.
    pub fn with_limit(reads_per_sec: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(reads_per_sec).expect("reads_per_sec must be > 0"),
        );
        Self {
            limiter: Arc::new(GovLimiter::direct(quota)),
        }
    }

    /// Wait until a read slot is available.
    pub async fn wait_read(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a read slot without waiting. Returns true if acquired.
    pub fn try_read(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
