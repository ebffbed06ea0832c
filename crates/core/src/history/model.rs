use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::{Direction, IndexSnapshot, StockQuote};

/// Compact per-stock record kept in history. Fields are optional because
/// a stock can be in a degraded state at observation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockObservation {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_change_percent: f64,
    pub direction: Direction,
}

impl From<&StockQuote> for StockObservation {
    fn from(quote: &StockQuote) -> Self {
        StockObservation {
            price: quote.price,
            market_cap: quote.market_cap,
            price_change_percent: quote.price_change_percent,
            direction: quote.direction,
        }
    }
}

/// One history entry: the index snapshot plus every tracked stock's
/// observation at that moment, keyed by ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEntry {
    pub timestamp: DateTime<Utc>,
    pub index: IndexSnapshot,
    pub stocks: BTreeMap<String, StockObservation>,
}

impl HistoricalEntry {
    /// Flatten a cycle's per-layer quotes into one observation map.
    pub fn from_cycle(
        timestamp: DateTime<Utc>,
        index: IndexSnapshot,
        stocks_by_layer: &BTreeMap<String, Vec<StockQuote>>,
    ) -> Self {
        let mut stocks = BTreeMap::new();
        for quotes in stocks_by_layer.values() {
            for quote in quotes {
                stocks.insert(quote.ticker.clone(), StockObservation::from(quote));
            }
        }
        HistoricalEntry {
            timestamp,
            index,
            stocks,
        }
    }
}
