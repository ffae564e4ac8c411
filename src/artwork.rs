//! Provider-agnostic artwork model.
//!
//! Every source adapter normalizes its raw records into an [`ArtworkDraft`],
//! whose [`ArtworkDraft::finish`] applies the per-field defaults in one place.
//! The aggregator is the only component that sets [`Artwork::source`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Title used when a provider record has none.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Artist used when a provider record has none.
pub const DEFAULT_ARTIST: &str = "Artist Unknown";

/// Description used when a provider record has none.
pub const DEFAULT_DESCRIPTION: &str = "No description available.";

/// Style placeholder for providers that never expose a style field.
pub const NO_STYLE_PLACEHOLDER: &str = "No style (e.g. contemporary) available.";

#[allow(clippy::expect_used)]
static DISPLAYABLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://").expect("image URL regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>").expect("HTML tag regex is valid") // Static pattern, safe to panic
});

/// A normalized artwork record, identical in shape for every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Provider-scoped identifier.
    pub external_id: Option<String>,
    pub title: String,
    pub artist: String,
    /// Free-form date text, may be empty.
    pub date_painted: String,
    pub country_of_origin: String,
    pub description: String,
    pub department: String,
    /// May be empty or a provider placeholder.
    pub style: String,
    /// `None` marks the artwork as undisplayable; it is dropped by the aggregator.
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    /// Human-readable provider name, filled in by the aggregator.
    pub source: String,
}

impl Artwork {
    /// Returns true if the stored `image_url` itself starts with `http://` or `https://`.
    ///
    /// No trimming happens here; [`ArtworkDraft::finish`] trims adapter URLs.
    #[must_use]
    pub fn has_displayable_image(&self) -> bool {
        self.image_url
            .as_deref()
            .is_some_and(|url| DISPLAYABLE_URL.is_match(url))
    }
}

impl Default for Artwork {
    fn default() -> Self {
        ArtworkDraft::default().finish()
    }
}

/// Optional-everything intermediate that adapters fill from raw provider JSON.
///
/// Blank strings count as absent, matching how the providers leave fields empty
/// rather than omitting them.
#[derive(Debug, Clone, Default)]
pub struct ArtworkDraft {
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub date_painted: Option<String>,
    pub country_of_origin: Option<String>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub style: Option<String>,
    pub image_url: Option<String>,
}

impl ArtworkDraft {
    /// Applies field defaults and produces a complete [`Artwork`] with an empty `source`.
    #[must_use]
    pub fn finish(self) -> Artwork {
        Artwork {
            external_id: non_blank(self.external_id),
            title: non_blank(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            artist: non_blank(self.artist).unwrap_or_else(|| DEFAULT_ARTIST.to_string()),
            date_painted: non_blank(self.date_painted).unwrap_or_default(),
            country_of_origin: non_blank(self.country_of_origin).unwrap_or_default(),
            description: non_blank(self.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            department: non_blank(self.department).unwrap_or_default(),
            style: non_blank(self.style).unwrap_or_default(),
            image_url: non_blank(self.image_url).map(|url| url.trim().to_string()),
            source: String::new(),
        }
    }
}

/// Returns `Some` only for values that contain something other than whitespace.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Removes every `<...>` tag from `text`.
#[must_use]
pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn with_image(url: Option<&str>) -> Artwork {
        Artwork {
            image_url: url.map(str::to_string),
            ..Artwork::default()
        }
    }

    #[test]
    fn test_empty_draft_gets_every_default() {
        let artwork = ArtworkDraft::default().finish();
        assert_eq!(artwork.external_id, None);
        assert_eq!(artwork.title, DEFAULT_TITLE);
        assert_eq!(artwork.artist, DEFAULT_ARTIST);
        assert_eq!(artwork.date_painted, "");
        assert_eq!(artwork.country_of_origin, "");
        assert_eq!(artwork.description, DEFAULT_DESCRIPTION);
        assert_eq!(artwork.department, "");
        assert_eq!(artwork.style, "");
        assert_eq!(artwork.image_url, None);
        assert_eq!(artwork.source, "");
    }

    #[test]
    fn test_blank_strings_are_treated_as_missing() {
        let artwork = ArtworkDraft {
            title: Some("   ".to_string()),
            artist: Some(String::new()),
            image_url: Some(" ".to_string()),
            ..ArtworkDraft::default()
        }
        .finish();
        assert_eq!(artwork.title, DEFAULT_TITLE);
        assert_eq!(artwork.artist, DEFAULT_ARTIST);
        assert_eq!(artwork.image_url, None);
    }

    #[test]
    fn test_present_values_are_kept() {
        let artwork = ArtworkDraft {
            external_id: Some("437133".to_string()),
            title: Some("Wheat Field with Cypresses".to_string()),
            artist: Some("Vincent van Gogh".to_string()),
            date_painted: Some("1889".to_string()),
            ..ArtworkDraft::default()
        }
        .finish();
        assert_eq!(artwork.external_id.as_deref(), Some("437133"));
        assert_eq!(artwork.title, "Wheat Field with Cypresses");
        assert_eq!(artwork.artist, "Vincent van Gogh");
        assert_eq!(artwork.date_painted, "1889");
    }

    #[test]
    fn test_displayable_image_accepts_http_and_https() {
        assert!(with_image(Some("https://images.metmuseum.org/a.jpg")).has_displayable_image());
        assert!(with_image(Some("http://example.com/b.png")).has_displayable_image());
        assert!(with_image(Some("HTTPS://example.com/c.png")).has_displayable_image());
    }

    #[test]
    fn test_displayable_image_rejects_padded_url() {
        assert!(!with_image(Some("  https://example.com/c.png")).has_displayable_image());
    }

    #[test]
    fn test_finish_trims_image_url() {
        let artwork = ArtworkDraft {
            image_url: Some("  https://x/padded.jpg \n".to_string()),
            ..ArtworkDraft::default()
        }
        .finish();
        assert_eq!(artwork.image_url.as_deref(), Some("https://x/padded.jpg"));
        assert!(artwork.has_displayable_image());
    }

    #[test]
    fn test_displayable_image_rejects_missing_blank_and_relative() {
        assert!(!with_image(None).has_displayable_image());
        assert!(!with_image(Some("")).has_displayable_image());
        assert!(!with_image(Some("   ")).has_displayable_image());
        assert!(!with_image(Some("/iiif/2/abc/full.jpg")).has_displayable_image());
        assert!(!with_image(Some("ftp://example.com/x.jpg")).has_displayable_image());
        assert!(!with_image(Some("data:image/png;base64,AAAA")).has_displayable_image());
    }

    #[test]
    fn test_strip_html_removes_tags_and_keeps_text() {
        assert_eq!(
            strip_html("<p>Oil on <em>canvas</em></p>"),
            "Oil on canvas"
        );
        assert_eq!(strip_html("Gift of <a href=\"x\">J. Doe</a>, 1929"), "Gift of J. Doe, 1929");
        assert_eq!(strip_html("no markup"), "no markup");
    }

    #[test]
    fn test_serializes_with_camel_case_and_image_url_key() {
        let artwork = with_image(Some("https://x/1.jpg"));
        let json = serde_json::to_value(&artwork).unwrap();
        assert_eq!(json["imageURL"], "https://x/1.jpg");
        assert_eq!(json["datePainted"], "");
        assert_eq!(json["countryOfOrigin"], "");
        assert!(json["externalId"].is_null());
    }
}
