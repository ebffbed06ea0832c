//! Bounded in-memory log of past index snapshots.

mod log;
mod model;

pub use log::{HistoryLog, MAX_HISTORY_ENTRIES};
pub use model::{HistoricalEntry, StockObservation};
