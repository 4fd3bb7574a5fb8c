//! Shared request budget
//!
//! Every outbound request, listing page or detail lookup, passes through one
//! `RequestLimiter` before it is sent. The limiter is a token bucket built on
//! `governor`: it admits `requests_per_second` on average and lets up to
//! `burst` requests through back to back. It is constructed once per run and
//! handed to the API client, so tests can swap in `RequestLimiter::unlimited`.
//!
//! Waiters are admitted in the order they called `acquire`. A FIFO
//! `tokio::sync::Mutex` sits in front of the bucket and only its holder polls
//! for a token, so a waiter is never overtaken by a later one.

use crate::config::CrawlerConfig;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token-bucket admission gate shared by every concurrent request
pub struct RequestLimiter {
    /// `None` admits every caller immediately
    bucket: Option<DirectLimiter>,

    /// Queue of waiters; held while waiting on the bucket
    gate: Mutex<()>,

    /// Number of admissions granted so far
    admitted: AtomicU64,
}

impl RequestLimiter {
    /// Creates a limiter admitting `per_second` requests with the given burst size
    ///
    /// Zero values are raised to one.
    pub fn new(per_second: u32, burst: u32) -> Self {
        let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            bucket: Some(RateLimiter::direct(quota)),
            gate: Mutex::new(()),
            admitted: AtomicU64::new(0),
        }
    }

    /// Creates a limiter from the crawler section of the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.requests_per_second, config.burst)
    }

    /// Creates a limiter that never waits
    pub fn unlimited() -> Self {
        Self {
            bucket: None,
            gate: Mutex::new(()),
            admitted: AtomicU64::new(0),
        }
    }

    /// Waits until one request may be sent
    ///
    /// Callers are served first come, first served. Never fails; dropping
    /// the returned future abandons the wait and gives up its place.
    pub async fn acquire(&self) {
        if let Some(bucket) = &self.bucket {
            let _turn = self.gate.lock().await;
            bucket.until_ready().await;
        }
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of admissions granted so far
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for RequestLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLimiter")
            .field("limited", &self.bucket.is_some())
            .field("admitted", &self.admitted())
            .finish()
    }
}
