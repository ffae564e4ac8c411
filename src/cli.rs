//! CLI argument definitions using clap derive macros.

use clap::{Args as ClapArgs, Parser, Subcommand};

use gallery_core::curation::{DEFAULT_DISCOVER_LIMIT, DEFAULT_MUSEUM_LIMIT};

/// Search, discover, and curate artworks across public museum APIs.
///
/// Queries the Met, the Art Institute of Chicago, the Cleveland Museum of
/// Art, Europeana and the Harvard Art Museums at once and prints one merged
/// list of artworks that have an image.
#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Per-request timeout in seconds (1-300), overrides the config file
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search every museum for a term
    Search(SearchArgs),
    /// Artworks whose artist matches a name exactly
    Artist(ArtistArgs),
    /// Artworks from a single museum
    Museum(MuseumArgs),
    /// Artworks for a curated theme (impressionism, renaissance, ...)
    Discover(DiscoverArgs),
    /// The featured artist of the day and their works
    Showcase(ShowcaseArgs),
    /// Show the effective configuration
    Config,
}

/// Output options shared by the listing commands.
#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Print artworks as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Maximum number of artworks to print
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    /// Search term (multiple words are joined with spaces)
    #[arg(value_name = "TERM", num_args = 0..)]
    pub term: Vec<String>,

    /// Keep source order instead of shuffling the merged list
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for the shuffle, for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ArtistArgs {
    /// Artist name as the museums record it
    #[arg(value_name = "NAME", required = true, num_args = 1..)]
    pub name: Vec<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct MuseumArgs {
    /// Source display name, or an alias: met, chicago, cleveland, europeana, harvard
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Search term sent to the museum (defaults to the museum's name)
    #[arg(long)]
    pub term: Option<String>,

    /// Maximum number of artworks to keep
    #[arg(long, default_value_t = DEFAULT_MUSEUM_LIMIT as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Print artworks as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct DiscoverArgs {
    /// Theme value or label
    #[arg(value_name = "THEME")]
    pub theme: String,

    /// Maximum number of artworks to keep
    #[arg(long, default_value_t = DEFAULT_DISCOVER_LIMIT as u64, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Print artworks as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseArgs {
    /// Day index to feature (defaults to days since the Unix epoch)
    #[arg(long)]
    pub day: Option<u64>,

    /// Print artworks as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// The search term with words joined by single spaces.
    #[must_use]
    pub fn joined_term(&self) -> String {
        self.term.join(" ").trim().to_string()
    }
}

impl ArtistArgs {
    #[must_use]
    pub fn joined_name(&self) -> String {
        self.name.join(" ").trim().to_string()
    }
}
