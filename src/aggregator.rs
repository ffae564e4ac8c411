//! Multi-source search aggregation.
//!
//! The [`Aggregator`] fans one query out to every registered [`Source`],
//! waits for all of them to settle, and merges the per-source lists into a
//! single list that is fair across sources, displayable, and free of markup.
//!
//! # Merge pipeline
//!
//! 1. Fan-out: every source searches concurrently; an `Err` or a panic from
//!    one source becomes an empty list for that source only.
//! 2. Tagging: each artwork's `source` is set to its adapter's name.
//! 3. Shuffle (optional): each list is permuted independently.
//! 4. Interleave: round-robin across sources from a random start index.
//! 5. Image gate: artworks without an `http(s)` image URL are dropped.
//! 6. Sanitize: HTML tags are stripped from the text fields.
//!
//! Repeated identical searches are expected to differ in order. Construct
//! with [`Aggregator::with_seed`] for reproducible output.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use crate::artwork::{Artwork, strip_html};
use crate::config::SearchConfig;
use crate::curation::{self, DEFAULT_SHOWCASE_LIMIT, DiscoveryTheme, FeaturedArtist};
use crate::source::{Source, build_default_sources};

/// Per-call search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Shuffle each source's list before interleaving.
    pub shuffle: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { shuffle: true }
    }
}

/// Fans searches out to a fixed set of sources and merges the results.
pub struct Aggregator {
    sources: Vec<Arc<dyn Source>>,
    rng: Mutex<StdRng>,
}

impl Aggregator {
    /// Creates an aggregator over `sources`, seeded from OS entropy.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn Source>>) -> Self {
        Self::with_rng(sources, StdRng::from_entropy())
    }

    /// Creates an aggregator whose shuffles and start indices derive from `seed`.
    #[must_use]
    pub fn with_seed(sources: Vec<Arc<dyn Source>>, seed: u64) -> Self {
        Self::with_rng(sources, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(sources: Vec<Arc<dyn Source>>, rng: StdRng) -> Self {
        Self {
            sources,
            rng: Mutex::new(rng),
        }
    }

    /// Creates an aggregator over the five default museum sources.
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(build_default_sources(config))
    }

    /// Display names of the registered sources, in registration order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// Searches every source with default options (shuffle on).
    pub async fn search(&self, term: &str) -> Vec<Artwork> {
        self.search_with(term, SearchOptions::default()).await
    }

    /// Searches every source and merges the results.
    ///
    /// Never fails: a source that errors or panics contributes nothing.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn search_with(&self, term: &str, options: SearchOptions) -> Vec<Artwork> {
        let mut lists = join_all(
            self.sources
                .iter()
                .map(|source| settle(source.as_ref(), term)),
        )
        .await;

        // Draw a per-call generator so the lock is never held across work.
        let mut rng = StdRng::seed_from_u64(self.next_seed());
        if options.shuffle {
            for list in &mut lists {
                shuffle_in_place(list, &mut rng);
            }
        }

        let start = if lists.is_empty() {
            0
        } else {
            rng.gen_range(0..lists.len())
        };
        let mut merged = interleave(lists, start);
        let before_gate = merged.len();
        retain_displayable(&mut merged);
        for artwork in &mut merged {
            sanitize_artwork(artwork);
        }

        info!(
            term,
            merged = before_gate,
            returned = merged.len(),
            "aggregate search complete"
        );
        merged
    }

    /// Clears every source's cache.
    pub fn clear_caches(&self) {
        for source in &self.sources {
            source.clear_cache();
        }
        debug!(sources = self.sources.len(), "cleared source caches");
    }

    /// Artworks whose artist matches `name` exactly (case-insensitive).
    pub async fn artist(&self, name: &str) -> Vec<Artwork> {
        curation::filter_by_artist(self.search(name).await, name)
    }

    /// Up to `limit` artworks from the source named `source_name`.
    ///
    /// `term` defaults to the source name itself. See
    /// [`curation::DEFAULT_MUSEUM_LIMIT`] for the usual cap.
    pub async fn museum(&self, source_name: &str, term: Option<&str>, limit: usize) -> Vec<Artwork> {
        let term = term.unwrap_or(source_name);
        let mut found = curation::filter_by_source(self.search(term).await, source_name);
        found.truncate(limit);
        found
    }

    /// Runs one search per theme term concurrently and concatenates them in
    /// theme order, capped at `limit`.
    #[instrument(skip(self, theme), fields(theme = theme.value))]
    pub async fn discover(&self, theme: &DiscoveryTheme, limit: usize) -> Vec<Artwork> {
        let results = join_all(theme.search_terms.iter().map(|term| self.search(term))).await;
        let mut flattened: Vec<Artwork> = results.into_iter().flatten().collect();
        flattened.truncate(limit);
        flattened
    }

    /// Featured artist for `day_index` and up to [`DEFAULT_SHOWCASE_LIMIT`]
    /// distinct-image artworks attributed to them.
    pub async fn showcase(&self, day_index: u64) -> (&'static FeaturedArtist, Vec<Artwork>) {
        let featured = curation::featured_artist_for_day(day_index);
        let found = self.search(featured.search_term).await;
        let mut unique = curation::dedupe_by_image(curation::filter_by_artist(found, featured.name));
        unique.truncate(DEFAULT_SHOWCASE_LIMIT);
        (featured, unique)
    }

    fn next_seed(&self) -> u64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .r#gen()
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("sources", &self.source_names())
            .finish_non_exhaustive()
    }
}

/// Runs one source's search and tags its results, isolating errors and panics.
async fn settle(source: &dyn Source, term: &str) -> Vec<Artwork> {
    let name = source.name();
    // `search` is called inside the guarded future: a panic before it returns is caught too.
    let guarded = AssertUnwindSafe(async move { source.search(term).await });
    match guarded.catch_unwind().await {
        Ok(Ok(mut artworks)) => {
            debug!(source = name, count = artworks.len(), "source settled");
            for artwork in &mut artworks {
                artwork.source = name.to_string();
            }
            artworks
        }
        Ok(Err(error)) => {
            warn!(source = name, error = %error, "source search failed; skipping source");
            Vec::new()
        }
        Err(_) => {
            warn!(source = name, "source search panicked; skipping source");
            Vec::new()
        }
    }
}

/// Merges `lists` round-robin, starting at list `start % lists.len()`.
///
/// Exhausted lists are skipped; the output length is the sum of the input
/// lengths.
#[must_use]
pub fn interleave<T>(lists: Vec<Vec<T>>, start: usize) -> Vec<T> {
    let total: usize = lists.iter().map(Vec::len).sum();
    let width = lists.len();
    let mut cursors: Vec<std::vec::IntoIter<T>> = lists.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(total);
    let mut index = start;
    while merged.len() < total {
        if let Some(item) = cursors[index % width].next() {
            merged.push(item);
        }
        index = index.wrapping_add(1);
    }
    merged
}

/// Uniformly permutes `items` (Fisher-Yates).
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Drops artworks without a displayable `http(s)` image URL.
pub fn retain_displayable(items: &mut Vec<Artwork>) {
    items.retain(Artwork::has_displayable_image);
}

/// Strips HTML tags from the free-text fields of `artwork`.
pub fn sanitize_artwork(artwork: &mut Artwork) {
    for field in [
        &mut artwork.title,
        &mut artwork.artist,
        &mut artwork.description,
        &mut artwork.department,
        &mut artwork.style,
        &mut artwork.source,
    ] {
        *field = strip_html(field);
    }
}
