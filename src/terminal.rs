//! Terminal detection, log setup and the progress spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::VerbositySetting;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_spinner(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Picks the default log level.
///
/// Priority: `-q` > `-v` count > config file verbosity > warn.
pub(crate) fn default_log_level(
    quiet: bool,
    verbose: u8,
    file_verbosity: Option<VerbositySetting>,
) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => match file_verbosity {
            Some(VerbositySetting::Quiet) => "error",
            Some(VerbositySetting::Verbose) => "info",
            Some(VerbositySetting::Debug) => "debug",
            Some(VerbositySetting::Default) | None => "warn",
        },
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber; `RUST_LOG` wins unless `force_cli_level`.
pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

/// Spinner shown on stderr while sources are queried.
pub(crate) struct SearchSpinner {
    bar: Option<ProgressBar>,
}

impl SearchSpinner {
    pub(crate) fn start(enabled: bool, message: String) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub(crate) fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
