//! Domain models shared by all quote providers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily closing price for a ticker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClose {
    /// Calendar trading day (no time component).
    pub date: NaiveDate,

    /// Closing price on that day.
    pub close: f64,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Static snapshot data for a ticker, fetched once per cycle.
///
/// The market cap is the provider's *current* figure; reconstructing a
/// historical market cap from it is the caller's concern.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSummary {
    pub symbol: String,

    /// Current market capitalization in the quote currency.
    /// `None` when the provider has no figure for this symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
}
