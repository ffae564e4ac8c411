//! Rendering of artwork lists for the terminal or as JSON.

use std::io::Write;

use anyhow::{Context, Result};
use gallery_core::Artwork;

/// Writes `artworks` either as a pretty JSON array or as two lines per artwork.
pub(crate) fn render_artworks(out: &mut impl Write, artworks: &[Artwork], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, artworks).context("Failed to encode artworks as JSON")?;
        writeln!(out)?;
        return Ok(());
    }
    for (index, artwork) in artworks.iter().enumerate() {
        writeln!(out, "{:>3}. {}", index + 1, artwork_line(artwork))?;
        if let Some(url) = artwork.image_url.as_deref() {
            writeln!(out, "     {url}")?;
        }
    }
    Ok(())
}

fn artwork_line(artwork: &Artwork) -> String {
    let date = artwork.date_painted.trim();
    if date.is_empty() {
        format!("{} - {} [{}]", artwork.title, artwork.artist, artwork.source)
    } else {
        format!("{} - {} ({date}) [{}]", artwork.title, artwork.artist, artwork.source)
    }
}

/// Applies an optional `--limit` to an already ordered list.
pub(crate) fn apply_limit(mut artworks: Vec<Artwork>, limit: Option<u64>) -> Vec<Artwork> {
    if let Some(limit) = limit.and_then(|value| usize::try_from(value).ok()) {
        artworks.truncate(limit);
    }
    artworks
}
