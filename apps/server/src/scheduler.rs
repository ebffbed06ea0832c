//! Background tasks: the periodic update cycle and the one-shot ratio
//! series backfill.

use std::sync::Arc;

use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::main_lib::AppState;

/// Starts the periodic fetch-and-aggregate loop. The first tick fires
/// immediately so the server has data as soon as the first cycle ends.
pub fn start_update_scheduler(state: Arc<AppState>) {
    let minutes = state.tracker.update_interval_minutes();
    tokio::spawn(async move {
        info!("Update scheduler started ({}-minute interval)", minutes);
        let mut tick = interval(Duration::from_secs(minutes * 60));
        loop {
            tick.tick().await;
            state.tracker.run_update_cycle().await;
        }
    });
}

/// Extends the layer-ratio series once at startup. Failures are logged;
/// the next server start retries from whatever the cache holds.
pub fn start_ratio_backfill(state: Arc<AppState>) {
    tokio::spawn(async move {
        if let Err(e) = state.tracker.extend_ratio_history().await {
            error!("Ratio series extension failed: {}", e);
        }
    });
}
