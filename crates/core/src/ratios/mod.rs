//! Daily layer-ratio series: per-layer market caps back-projected over a
//! lookback window and normalized against the first layer.

mod cache;
mod model;

pub use cache::{extension_window, merge_series, RatioSeriesBuilder, RATIO_LOOKBACK_DAYS};
pub use model::LayerRatioPoint;
