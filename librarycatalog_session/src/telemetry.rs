use anyhow::Context;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::app_config::CatalogConfig;

/// Installs the subscriber named after the configured app, falling back to the configured level
pub fn init_telemetry_from_config(config: &CatalogConfig) -> anyhow::Result<()> {
    init_telemetry(&config.app_name, &config.log_level)
}

/// Installs the global `tracing` subscriber emitting bunyan formatted JSON logs to stdout.
///
/// The level is tunable via `RUST_LOG`, `default_level` applies when it is not set.
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(app_name: &str, default_level: &str) -> anyhow::Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::try_new(default_level)
            .with_context(|| format!("Invalid log level {}", default_level))?,
    };
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install `tracing` subscriber.")
}
