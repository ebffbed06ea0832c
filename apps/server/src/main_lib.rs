use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use stackindex_core::config::IndexConfig;
use stackindex_core::history::HistoricalEntry;
use stackindex_core::ratios::LayerRatioPoint;
use stackindex_core::store::JsonFileStore;
use stackindex_core::tracker::TrackerService;
use stackindex_market_data::YahooProvider;

use crate::config::Config;

pub struct AppState {
    pub tracker: Arc<TrackerService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SIDX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let index_config = IndexConfig::load(Path::new(&config.config_path))?;
    tracing::info!(
        "Loaded index config with {} layers from {}",
        index_config.layers.len(),
        config.config_path
    );

    let provider = Arc::new(YahooProvider::new()?);

    let data_dir = PathBuf::from(&config.data_dir);
    let history_store: Arc<JsonFileStore<HistoricalEntry>> =
        Arc::new(JsonFileStore::new(data_dir.join("historical_data.json")));
    let ratio_store: Arc<JsonFileStore<LayerRatioPoint>> = Arc::new(JsonFileStore::new(
        data_dir.join("layer_ratio_history.json"),
    ));

    let tracker = Arc::new(TrackerService::new(
        index_config,
        provider,
        history_store,
        ratio_store,
    ));

    Ok(Arc::new(AppState { tracker }))
}
