//! Rate-limited batch fetching of per-item detail records.
//!
//! Two-phase sources (search → ID list → per-ID detail) must not fire dozens
//! of detail requests at once. The [`BatchFetcher`] splits the ID list into
//! fixed-size batches, runs each batch concurrently, and sleeps between
//! batches, so at most `batch_size` requests are in flight and the request
//! rate stays near `batch_size / (delay + batch latency)`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gallery_core::batch::{BatchFetcher, BatchPolicy};
//!
//! # async fn example() {
//! let fetcher = BatchFetcher::new(BatchPolicy::new(15, Duration::from_millis(300), 60));
//! let ids: Vec<u64> = (1..=33).collect();
//! let records = fetcher
//!     .fetch_all(&ids, |id| async move { Ok::<_, std::io::Error>(id * 10) })
//!     .await;
//! assert_eq!(records.len(), 33);
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, instrument};

/// Default number of concurrent requests per batch.
pub const DEFAULT_BATCH_SIZE: usize = 15;

/// Default pause between consecutive batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(300);

/// Default cap on the number of identifiers fetched per search.
pub const DEFAULT_MAX_ITEMS: usize = 60;

/// Pacing parameters for a [`BatchFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    batch_size: usize,
    delay: Duration,
    max_items: usize,
}

impl BatchPolicy {
    /// Creates a policy. A `batch_size` of zero is raised to one.
    #[must_use]
    pub fn new(batch_size: usize, delay: Duration, max_items: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
            max_items,
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_BATCH_DELAY, DEFAULT_MAX_ITEMS)
    }
}

/// Fetches detail records for a list of identifiers in paced batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchFetcher {
    policy: BatchPolicy,
}

impl BatchFetcher {
    #[must_use]
    pub fn new(policy: BatchPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Number of batches needed for `id_count` identifiers after the item cap.
    #[must_use]
    pub fn batch_count(&self, id_count: usize) -> usize {
        id_count
            .min(self.policy.max_items)
            .div_ceil(self.policy.batch_size)
    }

    /// Runs `fetch` for every identifier (up to `max_items`) and collects the successes.
    ///
    /// Batch N+1 starts only after every request of batch N has settled and
    /// the inter-batch delay has elapsed. An identifier whose fetch fails is
    /// logged and left out; it never aborts its batch or later batches.
    /// Output order follows batch order, not a guarantee callers should rely on.
    #[instrument(skip_all, fields(ids = ids.len(), batch_size = self.policy.batch_size))]
    pub async fn fetch_all<Id, T, E, F, Fut>(&self, ids: &[Id], fetch: F) -> Vec<T>
    where
        Id: Clone + Display,
        E: Display,
        F: Fn(Id) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let capped = &ids[..ids.len().min(self.policy.max_items)];
        if capped.len() < ids.len() {
            debug!(
                requested = ids.len(),
                capped = capped.len(),
                "capping detail fetches"
            );
        }

        let batch_total = self.batch_count(capped.len());
        let mut records = Vec::with_capacity(capped.len());
        let mut failed: usize = 0;

        for (index, batch) in capped.chunks(self.policy.batch_size).enumerate() {
            let settled = join_all(batch.iter().map(|id| {
                let request = fetch(id.clone());
                async move { (id, request.await) }
            }))
            .await;

            for (id, outcome) in settled {
                match outcome {
                    Ok(record) => records.push(record),
                    Err(error) => {
                        failed += 1;
                        debug!(id = %id, error = %error, "detail fetch failed, skipping item");
                    }
                }
            }

            if index + 1 < batch_total {
                debug!(
                    batch = index + 1,
                    of = batch_total,
                    delay_ms = self.policy.delay.as_millis(),
                    "pausing between batches"
                );
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        debug!(fetched = records.len(), failed, "batch fetch complete");
        records
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;

    const LATENCY: Duration = Duration::from_millis(50);

    #[test]
    fn test_policy_default_values() {
        let policy = BatchPolicy::default();
        assert_eq!(policy.batch_size(), 15);
        assert_eq!(policy.delay(), Duration::from_millis(300));
        assert_eq!(policy.max_items(), 60);
    }

    #[test]
    fn test_policy_zero_batch_size_raised_to_one() {
        let policy = BatchPolicy::new(0, Duration::ZERO, 10);
        assert_eq!(policy.batch_size(), 1);
    }

    #[test]
    fn test_batch_count_respects_cap() {
        let fetcher = BatchFetcher::new(BatchPolicy::new(15, Duration::ZERO, 60));
        assert_eq!(fetcher.batch_count(0), 0);
        assert_eq!(fetcher.batch_count(33), 3);
        assert_eq!(fetcher.batch_count(60), 4);
        assert_eq!(fetcher.batch_count(500), 4);
    }

    #[tokio::test]
    async fn test_33_ids_run_as_three_paced_batches() {
        tokio::time::pause();

        let delay = Duration::from_millis(300);
        let fetcher = BatchFetcher::new(BatchPolicy::new(15, delay, 60));
        let starts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let ids: Vec<u32> = (0..33).collect();

        let results = fetcher
            .fetch_all(&ids, |id| {
                let starts = Arc::clone(&starts);
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    starts.lock().unwrap().push(Instant::now());
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(LATENCY).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(id)
                }
            })
            .await;

        assert_eq!(results.len(), 33);
        assert_eq!(peak.load(Ordering::SeqCst), 15, "never more than one batch in flight");

        let starts = starts.lock().unwrap().clone();
        let mut groups: Vec<(Instant, usize)> = Vec::new();
        for start in starts {
            match groups.last_mut() {
                Some((at, count)) if *at == start => *count += 1,
                _ => groups.push((start, 1)),
            }
        }
        let sizes: Vec<usize> = groups.iter().map(|(_, n)| *n).collect();
        assert_eq!(sizes, vec![15, 15, 3]);

        for pair in groups.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(
                gap >= LATENCY + delay,
                "batch start gap {gap:?} must cover batch latency plus delay"
            );
        }
    }

    #[tokio::test]
    async fn test_single_batch_has_no_trailing_delay() {
        tokio::time::pause();

        let fetcher = BatchFetcher::new(BatchPolicy::new(15, Duration::from_secs(10), 60));
        let ids: Vec<u32> = (0..5).collect();
        let start = Instant::now();

        let results = fetcher
            .fetch_all(&ids, |id| async move { Ok::<_, String>(id) })
            .await;

        assert_eq!(results.len(), 5);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_failed_items_are_skipped_without_aborting() {
        let fetcher = BatchFetcher::new(BatchPolicy::new(3, Duration::ZERO, 60));
        let ids: Vec<u32> = (1..=10).collect();

        let mut results = fetcher
            .fetch_all(&ids, |id| async move {
                if id % 2 == 0 {
                    Err(format!("object {id} unavailable"))
                } else {
                    Ok(id)
                }
            })
            .await;

        results.sort_unstable();
        assert_eq!(results, vec![1, 3, 5, 7, 9]);
    }

    #[tokio::test]
    async fn test_ids_beyond_max_items_are_never_fetched() {
        let fetcher = BatchFetcher::new(BatchPolicy::new(15, Duration::ZERO, 60));
        let calls = Arc::new(AtomicUsize::new(0));
        let ids: Vec<u32> = (0..200).collect();

        let results = fetcher
            .fetch_all(&ids, |id| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(id)
                }
            })
            .await;

        assert_eq!(results.len(), 60);
        assert_eq!(calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test]
    async fn test_empty_id_list_returns_empty() {
        let fetcher = BatchFetcher::default();
        let ids: Vec<u32> = Vec::new();
        let results = fetcher
            .fetch_all(&ids, |id| async move { Ok::<_, String>(id) })
            .await;
        assert!(results.is_empty());
    }
}
