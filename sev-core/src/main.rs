//! Asset preflight (sev-preflight) - Main entry point
//!
//! Runs the site's preloader against a deployed origin and reports what the
//! loading screen would see: how many assets settled and which ones failed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sev_common::config::{resolve_config_path, AppConfig, CONFIG_ENV_VAR};
use sev_common::events::EventBus;
use sev_core::preload::{AssetManifest, HttpFetcher, Preloader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sev-preflight
#[derive(Parser, Debug)]
#[command(name = "sev-preflight")]
#[command(about = "Preload the promo site's media assets and report the result")]
#[command(version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "SEVERANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Origin to fetch assets from (overrides [preload] base_url)
    #[arg(short, long, env = "SEVERANCE_BASE_URL")]
    base_url: Option<String>,

    /// Print the final preload state as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_path) = load_config(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        config.preload.base_url = base_url;
    }

    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sev_core={level},sev_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Config is read before the subscriber exists, so report its origin now
    match &config_path {
        Some(path) => info!(path = %path.display(), "Loaded configuration"),
        None => info!("No config file found, using built-in defaults"),
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(config, args.json))
}

/// Resolve the config file (CLI, then env var, then platform dir) and load it
fn load_config(cli_arg: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
        Some(path) => {
            let config = AppConfig::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok((config, Some(path)))
        }
        None => Ok((AppConfig::default(), None)),
    }
}

async fn run(config: AppConfig, json: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.preload.base_url)
        .with_context(|| format!("Invalid base URL: {}", config.preload.base_url))?;
    info!(base_url = %fetcher.base_url(), "Starting asset preflight");

    let manifest = AssetManifest::from(&config.preload);
    let preloader = Preloader::new(manifest, Arc::new(fetcher), Some(EventBus::default()));

    let mut progress = preloader.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            info!(
                loaded = state.loaded_count,
                total = state.total_count,
                "Preload {}%",
                state.progress_percent
            );
            if state.is_complete {
                break;
            }
        }
    });

    tokio::select! {
        _ = preloader.start() => {},
        result = signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            warn!("Interrupted, preflight incomplete");
        },
    }
    reporter.abort();

    let state = preloader.state();
    for error in &state.errors {
        warn!("{}", error);
    }
    info!(
        loaded = state.loaded_count,
        total = state.total_count,
        errors = state.error_count(),
        complete = state.is_complete,
        "Preflight finished"
    );

    if json {
        let out = serde_json::to_string_pretty(&state).context("Failed to serialize preload state")?;
        println!("{}", out);
    }

    Ok(())
}
