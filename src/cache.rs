// ⏳ Grade Table Cache - keyed values with time-based expiry
// Time is explicit: the clock is injected so expiry is deterministic in tests

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Default lifetime of a cached table
pub const CACHE_DURATION_SECS: i64 = 5 * 60;

// ============================================================================
// CLOCK
// ============================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ============================================================================
// CACHED TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct CachedTable<T> {
    pub key: String,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> CachedTable<T> {
    /// Stale once strictly more than `ttl` has passed since the write
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.timestamp > ttl
    }
}

// ============================================================================
// TABLE CACHE
// ============================================================================

pub struct TableCache<T, C = SystemClock> {
    entries: RwLock<HashMap<String, CachedTable<T>>>,
    ttl: Duration,
    clock: C,
}

impl<T: Clone> TableCache<T, SystemClock> {
    pub fn new() -> Self {
        TableCache::with_clock(SystemClock, Duration::seconds(CACHE_DURATION_SECS))
    }
}

impl<T: Clone> Default for TableCache<T, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clock> TableCache<T, C> {
    pub fn with_clock(clock: C, ttl: Duration) -> Self {
        TableCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, or `None` (stale entries are dropped)
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                None => {
                    tracing::debug!(key, "cache miss");
                    return None;
                }
                Some(cached) if !cached.is_stale(now, self.ttl) => {
                    tracing::debug!(key, "cache hit");
                    return Some(cached.data.clone());
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Re-check: a writer may have refreshed the key between the two locks
        if let Some(cached) = entries.get(key) {
            if !cached.is_stale(now, self.ttl) {
                return Some(cached.data.clone());
            }
        }
        entries.remove(key);
        tracing::debug!(key, "cache entry expired");
        None
    }

    /// Store `data`, overwriting any previous value and resetting its age
    pub fn set(&self, key: &str, data: T) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            CachedTable {
                key: key.to_string(),
                data,
                timestamp: self.clock.now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// TESTS
// ============================================================================
