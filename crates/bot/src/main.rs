use std::sync::Arc;

use anyhow::Context;
use catalog::Catalog;
use storefront::{Router, Storefront};
use telegram::BotApi;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod poll;

use config::load_settings;
use config::Settings;
use poll::PollOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings().map_err(|error| {
        error!(%error, "invalid configuration");
        error
    })?;
    let token = settings.bot_token().map_err(|error| {
        error!(%error, "FATAL: refusing to start without a bot credential");
        error
    })?;

    let catalog = load_catalog(&settings).map_err(|error| {
        error!(?error, "failed to load catalog");
        error
    })?;
    info!(
        categories = catalog.len(),
        products = catalog.product_count(),
        "catalog ready"
    );

    let api = BotApi::with_base_url(&settings.api_base_url, token);
    let me = api.get_me().await.map_err(|error| {
        error!(%error, "FATAL: bot credential was not accepted");
        anyhow::Error::new(error).context("failed to verify bot credential")
    })?;
    info!(bot_id = me.id, username = ?me.username, "bot authenticated");

    let router = Router::new(Arc::new(catalog), settings.presentation());
    let storefront = Storefront::new(router, api.clone());
    let options = PollOptions {
        timeout_seconds: settings.poll_timeout_seconds,
        max_concurrent_updates: settings.max_concurrent_updates,
    };

    tokio::select! {
        _ = poll::run(&api, &storefront, options) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("shutting down");
        }
    }

    Ok(())
}

fn load_catalog(settings: &Settings) -> anyhow::Result<Catalog> {
    match &settings.catalog_path {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin().context("built-in catalog is invalid"),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
