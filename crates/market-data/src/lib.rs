//! Market data access for stackindex.
//!
//! This crate is the quote-source collaborator: it knows how to fetch
//! daily close series and market-cap snapshots for a ticker, and nothing
//! about layers, indices, or caching. The aggregation engine in
//! `stackindex-core` consumes it through the [`QuoteProvider`] trait.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{DailyClose, InstrumentSummary};
pub use provider::{QuoteProvider, YahooProvider};
