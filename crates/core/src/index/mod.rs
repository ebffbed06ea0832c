//! Snapshot aggregation: per-ticker fetch outcomes in, one immutable
//! market-cap-weighted [`IndexSnapshot`] out.

mod aggregator;
mod model;

pub use aggregator::{build_snapshot, CycleOutput, FetchOutcome, TickerQuote};
pub use model::{format_market_cap, Direction, IndexSnapshot, LayerMetrics, StockQuote};
