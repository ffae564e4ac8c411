//! Curated views built on top of aggregated search results.
//!
//! These are the filters behind the artist, museum, discovery and showcase
//! views: pure functions over `Artwork` lists plus the fixed theme and
//! featured-artist tables.

use std::collections::HashSet;

use crate::artwork::Artwork;

/// Default cap on artworks returned by a discovery theme.
pub const DEFAULT_DISCOVER_LIMIT: usize = 50;

/// Default cap on artworks shown for the featured artist.
pub const DEFAULT_SHOWCASE_LIMIT: usize = 12;

/// Default cap on artworks shown for one museum.
pub const DEFAULT_MUSEUM_LIMIT: usize = 100;

/// A discovery theme: one search per listed term, results concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryTheme {
    pub label: &'static str,
    /// Stable identifier used on the command line.
    pub value: &'static str,
    pub search_terms: &'static [&'static str],
}

pub const DISCOVERY_THEMES: &[DiscoveryTheme] = &[
    DiscoveryTheme {
        label: "Impressionism",
        value: "impressionism",
        search_terms: &["Vincent Van Gogh", "Claude Monet", "Edgar Degas", "Camille Pissarro"],
    },
    DiscoveryTheme {
        label: "Renaissance",
        value: "renaissance",
        search_terms: &["Renaissance"],
    },
    DiscoveryTheme {
        label: "Modern Art",
        value: "modern",
        search_terms: &["Modern Art"],
    },
    DiscoveryTheme {
        label: "Portraits",
        value: "portraits",
        search_terms: &["Portrait"],
    },
    DiscoveryTheme {
        label: "Landscapes",
        value: "landscapes",
        search_terms: &["Landscape"],
    },
    DiscoveryTheme {
        label: "Abstract",
        value: "abstract",
        search_terms: &["Helen Frankenthaler", "Mark Rothko", "Jasper Johns", "Cy Twombly"],
    },
    DiscoveryTheme {
        label: "Surrealism",
        value: "surrealism",
        search_terms: &["Salvador Dali", "René Magritte", "Max Ernst"],
    },
];

/// Looks up a theme by value or label, ignoring case.
#[must_use]
pub fn find_theme(name: &str) -> Option<&'static DiscoveryTheme> {
    let name = name.trim();
    DISCOVERY_THEMES
        .iter()
        .find(|theme| theme.value.eq_ignore_ascii_case(name) || theme.label.eq_ignore_ascii_case(name))
}

/// An artist in the daily showcase rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeaturedArtist {
    /// Full name, matched against `Artwork::artist`.
    pub name: &'static str,
    /// Shorter term sent to the sources.
    pub search_term: &'static str,
    pub bio: &'static str,
}

pub const FEATURED_ARTISTS: &[FeaturedArtist] = &[
    FeaturedArtist {
        name: "Vincent van Gogh",
        search_term: "Van Gogh",
        bio: "Dutch Post-Impressionist painter known for bold colors and emotional honesty.",
    },
    FeaturedArtist {
        name: "Claude Monet",
        search_term: "Monet",
        bio: "French Impressionist painter famous for his water lilies and landscape paintings.",
    },
    FeaturedArtist {
        name: "Pablo Picasso",
        search_term: "Picasso",
        bio: "Spanish painter and sculptor, co-founder of Cubism and one of the most influential artists of the 20th century.",
    },
    FeaturedArtist {
        name: "Rembrandt van Rijn",
        search_term: "Rembrandt",
        bio: "Dutch Golden Age painter known for his masterful use of light and shadow.",
    },
    FeaturedArtist {
        name: "Georgia O'Keeffe",
        search_term: "O'Keeffe",
        bio: "American modernist artist known for her paintings of flowers and Southwest landscapes.",
    },
    FeaturedArtist {
        name: "Édouard Manet",
        search_term: "Manet",
        bio: "French painter who bridged Realism and Impressionism in 19th century art.",
    },
    FeaturedArtist {
        name: "Paul Cézanne",
        search_term: "Cézanne",
        bio: "French Post-Impressionist painter whose work laid foundations for Cubism.",
    },
    FeaturedArtist {
        name: "Wassily Kandinsky",
        search_term: "Kandinsky",
        bio: "Russian painter and art theorist, pioneer of abstract art.",
    },
];

/// Featured artist for `day_index`, rotating through [`FEATURED_ARTISTS`].
#[must_use]
pub fn featured_artist_for_day(day_index: u64) -> &'static FeaturedArtist {
    // FEATURED_ARTISTS is a non-empty constant table.
    let len = FEATURED_ARTISTS.len() as u64;
    let index = usize::try_from(day_index % len).unwrap_or_default();
    &FEATURED_ARTISTS[index]
}

/// Keeps artworks whose artist equals `name`, ignoring case.
#[must_use]
pub fn filter_by_artist(items: Vec<Artwork>, name: &str) -> Vec<Artwork> {
    let wanted = name.trim().to_lowercase();
    items
        .into_iter()
        .filter(|artwork| artwork.artist.trim().to_lowercase() == wanted)
        .collect()
}

/// Keeps artworks attributed to the source named `source_name`.
#[must_use]
pub fn filter_by_source(items: Vec<Artwork>, source_name: &str) -> Vec<Artwork> {
    items
        .into_iter()
        .filter(|artwork| artwork.source == source_name)
        .collect()
}

/// Keeps the first artwork per image URL; artworks without one are dropped.
#[must_use]
pub fn dedupe_by_image(items: Vec<Artwork>) -> Vec<Artwork> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|artwork| {
            artwork
                .image_url
                .as_ref()
                .is_some_and(|url| seen.insert(url.clone()))
        })
        .collect()
}
