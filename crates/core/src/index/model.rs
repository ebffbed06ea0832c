//! Snapshot models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sign of a price or index movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    /// Pure sign function: positive is up, negative is down, zero is neutral.
    pub fn of(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        }
    }
}

/// One tracked stock as of the latest fetch cycle.
///
/// `price` and `market_cap` are absent and `error` is present iff the
/// fetch for this ticker failed; the entry stays in its layer's list so
/// the UI can show the gap in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub ticker: String,
    pub name: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_formatted: String,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub direction: Direction,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Weighted metrics for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMetrics {
    pub total_market_cap: f64,
    pub total_market_cap_formatted: String,
    pub change_percent: f64,
    pub direction: Direction,
    /// Stocks with both a known market cap and a known change percent.
    pub stock_count: usize,
}

/// One complete, immutable index computation for a single fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    pub total_market_cap: f64,
    pub total_market_cap_formatted: String,
    pub change_percent: f64,
    pub direction: Direction,
    pub stock_count: usize,
    pub last_updated: DateTime<Utc>,
    pub layers: BTreeMap<String, LayerMetrics>,
}

/// Format a dollar market cap for display: `$1.2T`, `$340B`, `$58M`,
/// or raw dollars below one million. Display-only; never feeds back
/// into any computation.
pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.1}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.0}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.0}M", value / 1e6)
    } else {
        format!("${:.0}", value)
    }
}
