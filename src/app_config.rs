//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use gallery_core::config::{EUROPEANA_API_KEY_ENV, HARVARD_API_KEY_ENV};
use gallery_core::{BatchPolicy, SearchConfig};

/// File configuration for gallery defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Lifetime of cached search results in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// Concurrent detail requests per batch.
    pub batch_size: Option<u64>,
    /// Pause between detail batches in milliseconds.
    pub batch_delay_ms: Option<u64>,
    /// Cap on detail records fetched per search.
    pub max_detail_items: Option<u64>,
    /// Cap on records kept from one-phase sources.
    pub max_results: Option<u64>,
    pub europeana_api_key: Option<String>,
    pub harvard_api_key: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_range("cache_ttl_secs", self.cache_ttl_secs, 0, 86_400)?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 1, 300)?;
        validate_range("connect_timeout_secs", self.connect_timeout_secs, 1, 300)?;
        validate_range("batch_size", self.batch_size, 1, 100)?;
        validate_range("batch_delay_ms", self.batch_delay_ms, 0, 60_000)?;
        validate_range("max_detail_items", self.max_detail_items, 1, 500)?;
        validate_range("max_results", self.max_results, 1, 500)?;
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/gallery/config.toml`
/// 2. `$HOME/.config/gallery/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("gallery").join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("gallery")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;
        let integer = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_number}"))
        };
        let string = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_number}"))
        };

        match key {
            "cache_ttl_secs" => cfg.cache_ttl_secs = Some(integer()?),
            "request_timeout_secs" => cfg.request_timeout_secs = Some(integer()?),
            "connect_timeout_secs" => cfg.connect_timeout_secs = Some(integer()?),
            "batch_size" => cfg.batch_size = Some(integer()?),
            "batch_delay_ms" => cfg.batch_delay_ms = Some(integer()?),
            "max_detail_items" => cfg.max_detail_items = Some(integer()?),
            "max_results" => cfg.max_results = Some(integer()?),
            "europeana_api_key" => cfg.europeana_api_key = non_empty(string()?),
            "harvard_api_key" => cfg.harvard_api_key = non_empty(string()?),
            "verbosity" => {
                let parsed = string()?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

/// Where an effective API key came from, for `gallery config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    Environment,
    File,
    Missing,
}

impl KeyOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "env",
            Self::File => "config file",
            Self::Missing => "not set",
        }
    }
}

/// Builds the library configuration from file values and environment lookups.
///
/// API keys from the environment win over the file; tunables come from the
/// file or fall back to library defaults. CLI overrides are applied by the
/// caller afterwards.
#[must_use]
pub fn resolve_search_config(
    file: Option<&FileConfig>,
    lookup: impl Fn(&str) -> Option<String>,
) -> SearchConfig {
    let env_config = SearchConfig::from_env_with(lookup);
    let Some(file) = file else {
        return env_config;
    };

    let defaults = SearchConfig::default();
    let usize_or = |value: Option<u64>, fallback: usize| {
        value
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(fallback)
    };
    let batch = BatchPolicy::new(
        usize_or(file.batch_size, defaults.batch.batch_size()),
        file.batch_delay_ms
            .map_or(defaults.batch.delay(), Duration::from_millis),
        usize_or(file.max_detail_items, defaults.batch.max_items()),
    );

    SearchConfig {
        cache_ttl: file
            .cache_ttl_secs
            .map_or(defaults.cache_ttl, Duration::from_secs),
        request_timeout: file
            .request_timeout_secs
            .map_or(defaults.request_timeout, Duration::from_secs),
        connect_timeout: file
            .connect_timeout_secs
            .map_or(defaults.connect_timeout, Duration::from_secs),
        batch,
        max_results: usize_or(file.max_results, defaults.max_results),
        europeana_api_key: env_config
            .europeana_api_key
            .or_else(|| file.europeana_api_key.clone()),
        harvard_api_key: env_config
            .harvard_api_key
            .or_else(|| file.harvard_api_key.clone()),
        clock: defaults.clock,
    }
}

/// Reports where each API key would be read from.
#[must_use]
pub fn key_origins(
    file: Option<&FileConfig>,
    lookup: impl Fn(&str) -> Option<String>,
) -> [(&'static str, KeyOrigin); 2] {
    let env_config = SearchConfig::from_env_with(lookup);
    let origin = |from_env: bool, from_file: bool| {
        if from_env {
            KeyOrigin::Environment
        } else if from_file {
            KeyOrigin::File
        } else {
            KeyOrigin::Missing
        }
    };
    [
        (
            EUROPEANA_API_KEY_ENV,
            origin(
                env_config.europeana_api_key.is_some(),
                file.is_some_and(|f| f.europeana_api_key.is_some()),
            ),
        ),
        (
            HARVARD_API_KEY_ENV,
            origin(
                env_config.harvard_api_key.is_some(),
                file.is_some_and(|f| f.harvard_api_key.is_some()),
            ),
        ),
    ]
}

/// Masks a secret for display, keeping at most the last four characters.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
