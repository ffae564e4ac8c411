//! Config command handler: show effective configuration.

use anyhow::Result;
use gallery_core::SearchConfig;

use crate::app_config::{LoadedConfig, VerbositySetting, key_origins, mask_secret};

use super::CommandContext;

pub fn run_config_show_command(ctx: &CommandContext, loaded: &LoadedConfig) -> Result<()> {
    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file() {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );

    let effective: &SearchConfig = ctx.config();
    println!("cache_ttl_secs = {}", effective.cache_ttl.as_secs());
    println!("request_timeout_secs = {}", effective.request_timeout.as_secs());
    println!("connect_timeout_secs = {}", effective.connect_timeout.as_secs());
    println!("batch_size = {}", effective.batch.batch_size());
    println!("batch_delay_ms = {}", effective.batch.delay().as_millis());
    println!("max_detail_items = {}", effective.batch.max_items());
    println!("max_results = {}", effective.max_results);

    let origins = key_origins(loaded.config.as_ref(), |name| std::env::var(name).ok());
    let keys = [
        effective.europeana_api_key.as_deref(),
        effective.harvard_api_key.as_deref(),
    ];
    for ((env_name, origin), key) in origins.iter().zip(keys) {
        let shown = key.map_or_else(|| "<none>".to_string(), mask_secret);
        println!("{} = {shown} ({})", env_name.to_lowercase(), origin.as_str());
    }
    println!("sources = {}", ctx.source_names().join(", "));
    let verbosity = loaded
        .config
        .as_ref()
        .and_then(|config| config.verbosity)
        .unwrap_or(VerbositySetting::Default);
    println!("verbosity = {}", verbosity.as_str());

    Ok(())
}
