//! Listing command handlers: search, artist, museum, discover and showcase.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use gallery_core::curation::{DISCOVERY_THEMES, find_theme};
use gallery_core::{Aggregator, Artwork, SearchOptions};
use tracing::info;

use crate::cli::{ArtistArgs, DiscoverArgs, MuseumArgs, SearchArgs, ShowcaseArgs};

use super::CommandContext;
use super::output::{apply_limit, render_artworks};

const SECONDS_PER_DAY: u64 = 86_400;

pub async fn run_search_command(ctx: &CommandContext, args: &SearchArgs) -> Result<()> {
    let term = args.joined_term();
    if term.is_empty() {
        println!("Nothing to search for. Example: gallery search water lilies");
        return Ok(());
    }

    let aggregator = match args.seed {
        Some(seed) => Aggregator::with_seed(ctx.sources(), seed),
        None => Aggregator::new(ctx.sources()),
    };
    let options = SearchOptions {
        shuffle: !args.no_shuffle,
    };
    let spinner = ctx.spinner(format!("Searching {} museums for \"{term}\"", ctx.source_count()));
    let found = aggregator.search_with(&term, options).await;
    spinner.finish();

    info!(term = %term, count = found.len(), "search finished");
    let found = apply_limit(found, args.output.limit);
    emit(&found, args.output.json, &format!("No artworks found for \"{term}\"."))
}

pub async fn run_artist_command(ctx: &CommandContext, args: &ArtistArgs) -> Result<()> {
    let name = args.joined_name();
    let aggregator = Aggregator::new(ctx.sources());
    let spinner = ctx.spinner(format!("Looking up works by {name}"));
    let found = aggregator.artist(&name).await;
    spinner.finish();

    let found = apply_limit(found, args.output.limit);
    emit(&found, args.output.json, &format!("No artworks attributed to {name}."))
}

pub async fn run_museum_command(ctx: &CommandContext, args: &MuseumArgs) -> Result<()> {
    let aggregator = Aggregator::new(ctx.sources());
    let names = aggregator.source_names();
    let Some(source_name) = resolve_museum_name(&args.source, &names)? else {
        bail!(
            "Unknown museum '{}'.\n  Suggestion: use one of: {}",
            args.source,
            names.join(", ")
        );
    };
    let source_name = source_name.to_string();

    let spinner = ctx.spinner(format!("Browsing {source_name}"));
    let limit = usize::try_from(args.limit).unwrap_or(usize::MAX);
    let found = aggregator
        .museum(&source_name, args.term.as_deref(), limit)
        .await;
    spinner.finish();

    emit(&found, args.json, &format!("No artworks found at {source_name}."))
}

pub async fn run_discover_command(ctx: &CommandContext, args: &DiscoverArgs) -> Result<()> {
    let Some(theme) = find_theme(&args.theme) else {
        let known: Vec<&str> = DISCOVERY_THEMES.iter().map(|theme| theme.value).collect();
        bail!(
            "Unknown theme '{}'.\n  Suggestion: use one of: {}",
            args.theme,
            known.join(", ")
        );
    };

    let aggregator = Aggregator::new(ctx.sources());
    let spinner = ctx.spinner(format!("Discovering {}", theme.label));
    let limit = usize::try_from(args.limit).unwrap_or(usize::MAX);
    let found = aggregator.discover(theme, limit).await;
    spinner.finish();

    emit(&found, args.json, &format!("No artworks found for {}.", theme.label))
}

pub async fn run_showcase_command(ctx: &CommandContext, args: &ShowcaseArgs) -> Result<()> {
    let day = args.day.unwrap_or_else(today_index);
    let aggregator = Aggregator::new(ctx.sources());
    let spinner = ctx.spinner("Preparing today's showcase".to_string());
    let (featured, found) = aggregator.showcase(day).await;
    spinner.finish();

    if args.json {
        let payload = serde_json::json!({
            "artist": featured.name,
            "bio": featured.bio,
            "artworks": found,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Featured artist: {}", featured.name);
    println!("{}", featured.bio);
    println!();
    emit(&found, false, "No artworks found for today's artist.")
}

fn emit(found: &[Artwork], json: bool, empty_notice: &str) -> Result<()> {
    if found.is_empty() && !json {
        println!("{empty_notice}");
        return Ok(());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_artworks(&mut out, found, json)?;
    out.flush()?;
    Ok(())
}

fn today_index() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() / SECONDS_PER_DAY)
}

/// Matches `input` against a full source name or the start of any word in one.
///
/// Returns an error when a short alias matches more than one source.
fn resolve_museum_name<'a>(input: &str, names: &[&'a str]) -> Result<Option<&'a str>> {
    let wanted = input.trim().to_lowercase();
    if wanted.is_empty() {
        return Ok(None);
    }
    if let Some(exact) = names
        .iter()
        .copied()
        .find(|name| name.to_lowercase() == wanted)
    {
        return Ok(Some(exact));
    }
    let matches: Vec<&'a str> = names
        .iter()
        .copied()
        .filter(|name| {
            name.to_lowercase()
                .split_whitespace()
                .any(|word| word.starts_with(&wanted))
        })
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        _ => bail!(
            "Museum '{input}' is ambiguous: matches {}.\n  Suggestion: use the full museum name",
            matches.join(", ")
        ),
    }
}
