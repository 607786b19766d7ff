//! mpg-chart - headless runner for the player scatter chart controller
//!
//! Loads bootstrap configuration, performs the initial fetch with the default
//! filter selection and writes every published chart view to stdout as one
//! JSON line, for a renderer to pick up.

use anyhow::{bail, Result};
use mpg_chart::{build_controller, ChartEvent, ChartEventBus, SyncOutcome};
use mpg_common::TomlConfig;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing first so config loading is logged; RUST_LOG wins over the configured level
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("info"), false),
    };
    let (filter, filter_handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting mpg-chart v{}", env!("CARGO_PKG_VERSION"));

    let toml_config = TomlConfig::load_or_default()?;
    apply_configured_level(&filter_handle, from_env, &toml_config.logging.level)?;

    let events = ChartEventBus::default();
    let mut rx = events.subscribe();
    let mut controller = build_controller(&toml_config, events)?;

    let outcome = controller.load().await;

    loop {
        match rx.try_recv() {
            Ok(ChartEvent::DatasetPublished { view, .. }) => {
                println!("{}", serde_json::to_string(&view)?);
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(n)) => warn!("Dropped {} chart events", n),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    match outcome {
        SyncOutcome::Published { series, .. } => {
            info!("Initial load published {} series", series);
            Ok(())
        }
        SyncOutcome::EmptyResult { dropped } => {
            warn!("Initial load returned {} records, none plottable", dropped);
            Ok(())
        }
        SyncOutcome::FetchFailed { error: e, .. } => {
            error!("Initial load failed: {}", e);
            bail!("initial load failed: {}", e)
        }
        SyncOutcome::Unchanged | SyncOutcome::Stale { .. } => Ok(()),
    }
}

/// Switch to the `[logging]` level unless RUST_LOG already chose one
fn apply_configured_level(handle: &FilterHandle, from_env: bool, level: &str) -> Result<()> {
    if !from_env {
        handle.reload(EnvFilter::new(level))?;
    }
    Ok(())
}
