//! CLI command handlers.

use std::sync::Arc;

use gallery_core::{SearchConfig, Source, build_default_sources};

use crate::terminal::SearchSpinner;

mod config;
mod output;
mod search;

pub use config::run_config_show_command;
pub use search::{
    run_artist_command, run_discover_command, run_museum_command, run_search_command,
    run_showcase_command,
};

/// Shared state for one CLI invocation: effective config and the source registry.
pub struct CommandContext {
    config: SearchConfig,
    sources: Vec<Arc<dyn Source>>,
    spinner_enabled: bool,
}

impl CommandContext {
    #[must_use]
    pub fn new(config: SearchConfig, spinner_enabled: bool) -> Self {
        let sources = build_default_sources(&config);
        Self {
            config,
            sources,
            spinner_enabled,
        }
    }

    pub(crate) fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Sources share their caches across every aggregator built from them.
    pub(crate) fn sources(&self) -> Vec<Arc<dyn Source>> {
        self.sources.clone()
    }

    pub(crate) fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub(crate) fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    pub(crate) fn spinner(&self, message: String) -> SearchSpinner {
        SearchSpinner::start(self.spinner_enabled, message)
    }
}
