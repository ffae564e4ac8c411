//! CLI entry point for the gallery tool.

use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

mod app_config;
mod cli;
mod commands;
mod terminal;

use app_config::{load_default_file_config, resolve_search_config};
use cli::{Cli, Command};
use commands::CommandContext;
use terminal::{
    default_log_level, init_tracing, is_dumb_terminal, no_color_env_requested, should_use_spinner,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    let loaded = load_default_file_config()?;
    let file_verbosity = loaded.config.as_ref().and_then(|config| config.verbosity);

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > warn
    let dumb_terminal = is_dumb_terminal();
    init_tracing(
        default_log_level(cli.quiet, cli.verbose, file_verbosity),
        false,
        no_color_env_requested() || dumb_terminal,
    );
    debug!(?cli, "CLI arguments parsed");

    let mut config = resolve_search_config(loaded.config.as_ref(), |name| std::env::var(name).ok());
    if let Some(timeout_secs) = cli.timeout_secs {
        config.request_timeout = Duration::from_secs(timeout_secs);
    }

    let spinner_enabled = should_use_spinner(io::stderr().is_terminal(), cli.quiet, dumb_terminal);
    let ctx = CommandContext::new(config, spinner_enabled);

    match &cli.command {
        Command::Search(args) => commands::run_search_command(&ctx, args).await,
        Command::Artist(args) => commands::run_artist_command(&ctx, args).await,
        Command::Museum(args) => commands::run_museum_command(&ctx, args).await,
        Command::Discover(args) => commands::run_discover_command(&ctx, args).await,
        Command::Showcase(args) => commands::run_showcase_command(&ctx, args).await,
        Command::Config => commands::run_config_show_command(&ctx, &loaded),
    }
}
