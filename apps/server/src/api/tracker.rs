use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use stackindex_core::history::HistoricalEntry;
use stackindex_core::ratios::LayerRatioPoint;
use stackindex_core::tracker::CurrentView;

use crate::main_lib::AppState;

/// All reads come from state the background scheduler keeps current, so
/// every handler here is infallible.
async fn get_stocks(State(state): State<Arc<AppState>>) -> Json<CurrentView> {
    Json(state.tracker.current())
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "updateInterval": state.tracker.update_interval_minutes(),
    }))
}

async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoricalEntry>> {
    Json(state.tracker.history())
}

async fn get_layer_ratios(State(state): State<Arc<AppState>>) -> Json<Vec<LayerRatioPoint>> {
    Json(state.tracker.layer_ratios())
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks", get(get_stocks))
        .route("/config", get(get_config))
        .route("/history", get(get_history))
        .route("/layer-ratios", get(get_layer_ratios))
        .route("/healthz", get(healthz))
}
