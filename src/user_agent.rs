//! Shared User-Agent string for every museum API client.
//!
//! One format for all sources so upstream operators can identify the tool
//! without per-source fingerprinting.

/// Default User-Agent for source requests.
#[must_use]
pub(crate) fn default_source_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("gallery/{version} (museum-search)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_contains_version_and_purpose() {
        let ua = default_source_user_agent();
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("gallery/").and_then(|s| s.split(' ').next()),
            "UA must contain crate version"
        );
        assert!(ua.ends_with("(museum-search)"), "UA must identify its purpose: {ua}");
        assert!(!ua.contains("http"), "UA carries no project URL: {ua}");
    }
}
