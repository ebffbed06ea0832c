use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's layer ratios. `layer1` is the normalization base and is
/// always `1.0`; the rest are that day's estimated layer cap divided by
/// layer one's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRatioPoint {
    pub date: NaiveDate,
    pub total_market_cap: f64,
    pub layer1: f64,
    pub layer2: f64,
    pub layer3: f64,
    pub layer4: f64,
}
