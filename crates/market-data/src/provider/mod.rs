//! Quote provider trait and implementations.

mod yahoo;

pub use yahoo::YahooProvider;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{DailyClose, InstrumentSummary};

/// Trait for quote sources.
///
/// Implement this trait to add support for a new market data source.
/// All methods operate on a single symbol; a failure never implies
/// anything about other symbols in the same batch.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the most recent daily closes for a symbol, looking back
    /// `lookback_days` calendar days from now. Closes are ordered by
    /// date ascending.
    async fn recent_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<DailyClose>, MarketDataError>;

    /// Fetch the current static data (market cap) for a symbol.
    async fn instrument_summary(
        &self,
        symbol: &str,
    ) -> Result<InstrumentSummary, MarketDataError>;

    /// Fetch daily closes for a symbol between `start` (inclusive) and
    /// `end` (exclusive), ordered by date ascending.
    async fn closes_in_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, MarketDataError>;
}
