//! Core aggregation and historical-cache engine for stackindex.
//!
//! The engine turns one fetch cycle's raw per-ticker quotes into a
//! market-cap-weighted composite index with per-layer sub-indices, and
//! maintains two persisted historical series: a bounded recent-snapshot
//! log and an unbounded date-indexed layer-ratio series.

pub mod config;
pub mod errors;
pub mod history;
pub mod index;
pub mod ratios;
pub mod store;
pub mod tracker;

pub use errors::{Error, Result};
