//! The tracker service: owns the live state, runs fetch cycles, and
//! extends the layer-ratio series.

mod service;


pub use service::{CurrentView, TrackerService, RECENT_CLOSES_LOOKBACK_DAYS};
