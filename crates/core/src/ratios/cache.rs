use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use stackindex_market_data::DailyClose;

use super::model::LayerRatioPoint;
use crate::config::LAYER_COUNT;

/// Window length used when no cached series exists yet.
pub const RATIO_LOOKBACK_DAYS: i64 = 365;

/// Decide which date range (start inclusive, end exclusive) still needs
/// computing. `None` means the cache already covers everything up to
/// yesterday and nothing should be recomputed or rewritten.
pub fn extension_window(
    last_cached: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    match last_cached {
        None => Some((today - Duration::days(RATIO_LOOKBACK_DAYS), today)),
        Some(last) => {
            let start = last + Duration::days(1);
            if start < today {
                Some((start, today))
            } else {
                None
            }
        }
    }
}

/// Accumulates per-layer market caps day by day, then normalizes.
///
/// A stock's cap on a past date is estimated by scaling its current cap
/// with the ratio of that day's close to the newest close in its series.
/// This holds share count constant over the window, which is accepted as
/// an approximation.
#[derive(Debug, Default)]
pub struct RatioSeriesBuilder {
    caps: BTreeMap<NaiveDate, [f64; LAYER_COUNT]>,
}

impl RatioSeriesBuilder {
    pub fn new() -> Self {
        RatioSeriesBuilder::default()
    }

    /// Fold one stock's close series into layer `layer_idx` (zero-based).
    /// Stocks with no closes or a zero latest close contribute nothing.
    pub fn add_series(&mut self, layer_idx: usize, market_cap: f64, closes: &[DailyClose]) {
        let Some(latest) = closes.last() else {
            return;
        };
        if latest.close <= 0.0 {
            return;
        }
        for close in closes {
            let cap_on_date = market_cap * (close.close / latest.close);
            self.caps.entry(close.date).or_default()[layer_idx] += cap_on_date;
        }
    }

    /// Produce the normalized series, ascending by date. Dates where any
    /// layer ended up with a zero cap are dropped: a ratio against a
    /// missing layer would be meaningless.
    pub fn build(self) -> Vec<LayerRatioPoint> {
        self.caps
            .into_iter()
            .filter(|(_, caps)| caps.iter().all(|&c| c > 0.0))
            .map(|(date, caps)| {
                let base = caps[0];
                LayerRatioPoint {
                    date,
                    total_market_cap: caps.iter().sum(),
                    layer1: 1.0,
                    layer2: caps[1] / base,
                    layer3: caps[2] / base,
                    layer4: caps[3] / base,
                }
            })
            .collect()
    }
}

/// Append newly computed points after the cached series. Any new point
/// dated at or before the cached maximum is discarded, so a cached date
/// is never overwritten.
pub fn merge_series(
    cached: Vec<LayerRatioPoint>,
    new: Vec<LayerRatioPoint>,
) -> Vec<LayerRatioPoint> {
    let cutoff = cached.last().map(|p| p.date);
    let mut merged = cached;
    merged.extend(
        new.into_iter()
            .filter(|p| cutoff.is_none_or(|max| p.date > max)),
    );
    merged
}
