//! Gallery Core Library
//!
//! Searches several public museum collection APIs at once and merges the
//! answers into one list of displayable artworks.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`artwork`] - Provider-agnostic artwork model and field defaults
//! - [`source`] - One adapter per museum API, behind the [`Source`] trait
//! - [`aggregator`] - Concurrent fan-out, fair interleaving, filtering
//! - [`batch`] - Rate-limited batch fetching of per-item detail records
//! - [`cache`] - TTL cache with an injectable clock
//! - [`curation`] - Artist, museum, discovery and showcase views
//! - [`config`] - Tunables and API keys
//!
//! # Example
//!
//! ```no_run
//! use gallery_core::{Aggregator, SearchConfig};
//!
//! # async fn example() {
//! let aggregator = Aggregator::from_config(&SearchConfig::from_env());
//! for artwork in aggregator.search("water lilies").await {
//!     println!("{} - {} [{}]", artwork.title, artwork.artist, artwork.source);
//! }
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod artwork;
pub mod batch;
pub mod cache;
pub mod config;
pub mod curation;
pub mod source;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use aggregator::{Aggregator, SearchOptions};
pub use artwork::{Artwork, ArtworkDraft};
pub use batch::{BatchFetcher, BatchPolicy};
pub use cache::{CacheEntry, Clock, ManualClock, SystemClock, TtlCache};
pub use config::SearchConfig;
pub use curation::{DISCOVERY_THEMES, DiscoveryTheme, FEATURED_ARTISTS, FeaturedArtist};
pub use source::{
    ChicagoSource, ClevelandSource, EuropeanaSource, HarvardSource, MetSource, Source,
    SourceError, build_default_sources,
};
