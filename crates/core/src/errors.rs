//! Core error types.
//!
//! Storage-specific errors are wrapped in string form so the store
//! abstraction stays backend-agnostic.

use thiserror::Error;

use stackindex_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the index tracker.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}
