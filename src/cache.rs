//! Time-to-live caching for per-adapter search and detail results.
//!
//! Each source adapter owns its own [`TtlCache`] instances; nothing is shared
//! between adapters. Expiry is lazy (checked on read) with an explicit
//! [`TtlCache::clear_expired`] sweep available.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use gallery_core::cache::{ManualClock, TtlCache};
//!
//! let clock = Arc::new(ManualClock::new(0));
//! let cache: TtlCache<String, u32> = TtlCache::with_clock(Duration::from_secs(60), clock.clone());
//!
//! cache.insert("monet".to_string(), 7);
//! assert_eq!(cache.get("monet"), Some(7));
//!
//! clock.advance(Duration::from_secs(60));
//! assert_eq!(cache.get("monet"), None);
//! ```

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::trace;

/// Default lifetime of a cache entry (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, duration_ms)
    }
}

/// Clock that only moves when told to. Used by tests to check TTL boundaries.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start_ms`.
    #[must_use]
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(start_ms),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(duration_ms(by), Ordering::SeqCst);
    }

    /// Sets the clock to an absolute value.
    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A cached value stamped with its creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Creation time in epoch milliseconds.
    pub timestamp: u64,
}

impl<T> CacheEntry<T> {
    /// Creates an entry stamped at `timestamp`.
    #[must_use]
    pub fn new(data: T, timestamp: u64) -> Self {
        Self { data, timestamp }
    }

    /// An entry is fresh while `now - timestamp < ttl`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: u64, ttl: Duration) -> bool {
        now_ms.saturating_sub(self.timestamp) < duration_ms(ttl)
    }
}

/// Key → entry map with a fixed TTL policy.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates a cache backed by the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with an injected clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is evicted and reported as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        {
            let entry = self.entries.get(key)?;
            if entry.is_fresh(now, self.ttl) {
                return Some(entry.data.clone());
            }
        }
        // Read guard released above; DashMap would deadlock otherwise.
        let ttl = self.ttl;
        self.entries
            .remove_if(key, |_, entry| !entry.is_fresh(now, ttl));
        trace!("evicted expired cache entry");
        None
    }

    /// Stores `data` stamped with the current time, replacing any previous entry.
    pub fn insert(&self, key: K, data: V) {
        let now = self.clock.now_ms();
        self.entries.insert(key, CacheEntry::new(data, now));
    }

    /// Stores a pre-stamped entry.
    pub fn insert_entry(&self, key: K, entry: CacheEntry<V>) {
        self.entries.insert(key, entry);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drops expired entries and returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
