//! mpg-chart library - filter-driven player scatter chart controller
//!
//! Keeps a scatter plot of the top-N players in sync with the user's filter
//! selection: decides when a selection change needs a new query to the record
//! source and when re-reading already fetched records is enough, then shapes
//! the records into a per-player colored dataset for the renderer.

pub mod controller;
pub mod display;
pub mod events;
pub mod fetcher;
pub mod filter;
pub mod projector;
pub mod query;
pub mod record;

pub use controller::{ChangeKind, ControllerState, FilterAction, SyncController, SyncOutcome};
pub use display::{ChartDisplay, ChartView};
pub use events::{ChartEvent, ChartEventBus};
pub use fetcher::{DataFetcher, FetchError, HttpRecordSource, RecordSource};
pub use filter::{FilterState, InvalidFilterError};
pub use projector::{Dataset, PlotSeries, Projector, RgbHex};
pub use query::QueryParams;
pub use record::Record;

use mpg_common::{ClientConfig, TomlConfig};
use std::sync::Arc;

/// Build a controller talking HTTP to the configured record source
pub fn build_controller(
    toml_config: &TomlConfig,
    events: ChartEventBus,
) -> anyhow::Result<SyncController> {
    let client_config = ClientConfig::resolve(toml_config)?;
    let source = HttpRecordSource::new(&client_config)?;
    tracing::info!("Record source: {}", source.endpoint_url());

    Ok(SyncController::new(
        DataFetcher::new(Arc::new(source)),
        Projector::new(toml_config.color_scheme),
        events,
    ))
}
