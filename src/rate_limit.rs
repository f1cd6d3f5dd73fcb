// 🚦 Rate Gate - minimum interval between table source requests
// Callers queue on an async mutex; one request starts per interval

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Requests per second allowed against the table source
pub const DEFAULT_RATE_PER_SEC: u32 = 5;

pub struct RateGate {
    /// Minimum spacing between two request starts
    interval: Duration,
    /// Start of the previous request (tokio clock, pausable in tests)
    last_start: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        RateGate {
            interval,
            last_start: Mutex::new(None),
        }
    }

    /// Gate allowing `rate` requests per second (0 is treated as 1)
    pub fn per_second(rate: u32) -> Self {
        RateGate::new(Duration::from_millis(1000 / u64::from(rate.max(1))))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next free slot and claim it
    ///
    /// The lock is held across the sleep, so concurrent callers queue and
    /// each one sees the slot claimed by the caller before it.
    pub async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;

        if let Some(wait) = delay_for(*last_start, Instant::now(), self.interval) {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate gate waiting");
            sleep(wait).await;
        }

        *last_start = Some(Instant::now());
    }

    /// Run `request` once a slot is free
    pub async fn run<F, T>(&self, request: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.acquire().await;
        request.await
    }
}

impl Default for RateGate {
    fn default() -> Self {
        RateGate::per_second(DEFAULT_RATE_PER_SEC)
    }
}

/// Remaining wait before a new request may start, `None` when it may start now
pub fn delay_for(last_start: Option<Instant>, now: Instant, interval: Duration) -> Option<Duration> {
    let last = last_start?;
    let elapsed = now.saturating_duration_since(last);
    if elapsed >= interval {
        None
    } else {
        Some(interval - elapsed)
    }
}

// ============================================================================
// TESTS
// ============================================================================
