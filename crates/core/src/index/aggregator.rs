//! Turns one fetch cycle's raw per-ticker outcomes into an index snapshot.
//!
//! Aggregation is market-cap weighted: a ticker contributes only when it
//! has both a known market cap and a known change percent. Failed or
//! incomplete tickers stay in their layer's list as degraded quotes but
//! are excluded from every sum. No retries happen here; a per-ticker
//! failure never aborts the cycle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use stackindex_market_data::DailyClose;

use super::model::{format_market_cap, Direction, IndexSnapshot, LayerMetrics, StockQuote};
use crate::config::StockInfo;

/// Raw data successfully fetched for one ticker.
#[derive(Debug, Clone)]
pub struct TickerQuote {
    /// Daily closes, ascending; at least two are needed to compute a change.
    pub closes: Vec<DailyClose>,
    /// Current market cap, when the provider has one.
    pub market_cap: Option<f64>,
}

/// Tagged per-ticker fetch result. Failures carry the reason so the
/// degraded quote can surface it.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub info: StockInfo,
    pub result: std::result::Result<TickerQuote, String>,
}

/// Everything one aggregation cycle produces.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    pub stocks: BTreeMap<String, Vec<StockQuote>>,
    pub index: IndexSnapshot,
}

/// Build the per-stock quotes, per-layer metrics, and index snapshot for
/// one cycle. `layers` is in config order; `now` stamps every entity.
pub fn build_snapshot(layers: &[(String, Vec<FetchOutcome>)], now: DateTime<Utc>) -> CycleOutput {
    let mut stocks: BTreeMap<String, Vec<StockQuote>> = BTreeMap::new();
    let mut layer_metrics: BTreeMap<String, LayerMetrics> = BTreeMap::new();

    let mut total_market_cap = 0.0;
    let mut weighted_return = 0.0;
    let mut contributing_stocks = 0usize;

    for (layer_name, outcomes) in layers {
        let quotes: Vec<StockQuote> = outcomes
            .iter()
            .map(|outcome| quote_from_outcome(outcome, now))
            .collect();

        let mut layer_total_mc = 0.0;
        let mut layer_weighted_return = 0.0;
        let mut layer_stock_count = 0usize;

        for quote in &quotes {
            // Only stocks with a known market cap and a computed change
            // contribute to the weighted sums.
            let Some(market_cap) = quote.market_cap else {
                continue;
            };
            if quote.error.is_some() {
                continue;
            }

            layer_total_mc += market_cap;
            layer_weighted_return += market_cap * quote.price_change_percent;
            layer_stock_count += 1;

            total_market_cap += market_cap;
            weighted_return += market_cap * quote.price_change_percent;
            contributing_stocks += 1;
        }

        let metrics = if layer_total_mc > 0.0 {
            let change_percent = layer_weighted_return / layer_total_mc;
            LayerMetrics {
                total_market_cap: layer_total_mc,
                total_market_cap_formatted: format_market_cap(layer_total_mc),
                change_percent,
                direction: Direction::of(change_percent),
                stock_count: layer_stock_count,
            }
        } else {
            LayerMetrics {
                total_market_cap: 0.0,
                total_market_cap_formatted: "N/A".to_string(),
                change_percent: 0.0,
                direction: Direction::Neutral,
                stock_count: 0,
            }
        };

        layer_metrics.insert(layer_name.clone(), metrics);
        stocks.insert(layer_name.clone(), quotes);
    }

    let index = if total_market_cap > 0.0 {
        let change_percent = weighted_return / total_market_cap;
        IndexSnapshot {
            total_market_cap,
            total_market_cap_formatted: format_market_cap(total_market_cap),
            change_percent,
            direction: Direction::of(change_percent),
            stock_count: contributing_stocks,
            last_updated: now,
            layers: layer_metrics,
        }
    } else {
        IndexSnapshot {
            total_market_cap: 0.0,
            total_market_cap_formatted: "N/A".to_string(),
            change_percent: 0.0,
            direction: Direction::Neutral,
            stock_count: 0,
            last_updated: now,
            layers: layer_metrics,
        }
    };

    CycleOutput { stocks, index }
}

/// Derive one stock quote from a fetch outcome. Any failure, including
/// fewer than two closes, yields a degraded quote with the reason inline.
fn quote_from_outcome(outcome: &FetchOutcome, now: DateTime<Utc>) -> StockQuote {
    let quote = match &outcome.result {
        Ok(quote) => quote,
        Err(reason) => return degraded_quote(&outcome.info, reason.clone(), now),
    };

    let n = quote.closes.len();
    if n < 2 {
        return degraded_quote(&outcome.info, "insufficient price history".to_string(), now);
    }

    let current_close = quote.closes[n - 1].close;
    let previous_close = quote.closes[n - 2].close;
    // Halted or delisted days can come back as zero bars; a division by
    // zero here would poison every weighted sum downstream.
    if previous_close <= 0.0 {
        return degraded_quote(&outcome.info, "non-positive previous close".to_string(), now);
    }
    let price_change = current_close - previous_close;
    let price_change_percent = 100.0 * price_change / previous_close;

    StockQuote {
        ticker: outcome.info.ticker.clone(),
        name: outcome.info.name.clone(),
        price: Some(current_close),
        market_cap: quote.market_cap,
        market_cap_formatted: quote
            .market_cap
            .map(format_market_cap)
            .unwrap_or_else(|| "N/A".to_string()),
        price_change,
        price_change_percent,
        direction: Direction::of(price_change),
        last_updated: now,
        error: None,
    }
}

fn degraded_quote(info: &StockInfo, reason: String, now: DateTime<Utc>) -> StockQuote {
    StockQuote {
        ticker: info.ticker.clone(),
        name: info.name.clone(),
        price: None,
        market_cap: None,
        market_cap_formatted: "N/A".to_string(),
        price_change: 0.0,
        price_change_percent: 0.0,
        direction: Direction::Neutral,
        last_updated: now,
        error: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn info(ticker: &str) -> StockInfo {
        StockInfo {
            ticker: ticker.to_string(),
            name: format!("{} Inc", ticker),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    /// Successful outcome whose last two closes produce the given change percent.
    fn quoted(ticker: &str, market_cap: Option<f64>, change_percent: f64) -> FetchOutcome {
        let previous = 100.0;
        let current = previous * (1.0 + change_percent / 100.0);
        FetchOutcome {
            info: info(ticker),
            result: Ok(TickerQuote {
                closes: vec![
                    DailyClose::new(day(1), previous),
                    DailyClose::new(day(2), current),
                ],
                market_cap,
            }),
        }
    }

    fn failed(ticker: &str, reason: &str) -> FetchOutcome {
        FetchOutcome {
            info: info(ticker),
            result: Err(reason.to_string()),
        }
    }

    #[test]
    fn test_worked_example_from_two_layers() {
        let layers = vec![
            ("layer1".to_string(), vec![quoted("AAA", Some(1000.0), 10.0)]),
            ("layer2".to_string(), vec![quoted("BBB", Some(3000.0), -5.0)]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        let layer1 = &output.index.layers["layer1"];
        let layer2 = &output.index.layers["layer2"];
        let layer3 = &output.index.layers["layer3"];
        assert!((layer1.change_percent - 10.0).abs() < 1e-9);
        assert!((layer2.change_percent + 5.0).abs() < 1e-9);
        assert_eq!(layer1.direction, Direction::Up);
        assert_eq!(layer2.direction, Direction::Down);
        assert_eq!(layer3.change_percent, 0.0);
        assert_eq!(layer3.direction, Direction::Neutral);
        assert_eq!(layer3.total_market_cap_formatted, "N/A");

        // (1000 * 10 + 3000 * -5) / 4000 = -1.25
        let expected = (1000.0 * 10.0 + 3000.0 * -5.0) / 4000.0;
        assert!((output.index.change_percent - expected).abs() < 1e-9);
        assert_eq!(output.index.direction, Direction::Down);
        assert_eq!(output.index.stock_count, 2);
        assert_eq!(output.index.total_market_cap, 4000.0);
    }

    #[test]
    fn test_index_weighting_matches_sum_over_layers() {
        let layers = vec![
            (
                "layer1".to_string(),
                vec![
                    quoted("AAA", Some(5_000.0), 3.5),
                    quoted("BBB", Some(1_200.0), -1.25),
                ],
            ),
            (
                "layer2".to_string(),
                vec![quoted("CCC", Some(800.0), 0.75)],
            ),
            ("layer3".to_string(), vec![quoted("DDD", Some(300.0), 12.0)]),
            ("layer4".to_string(), vec![quoted("EEE", Some(50.0), -8.0)]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        // Sum of per-layer weighted returns equals the index numerator.
        let layer_weighted_sum: f64 = output
            .index
            .layers
            .values()
            .map(|m| m.change_percent * m.total_market_cap)
            .sum();
        let index_weighted = output.index.change_percent * output.index.total_market_cap;
        assert!((layer_weighted_sum - index_weighted).abs() < 1e-6);
        assert_eq!(output.index.stock_count, 5);
    }

    #[test]
    fn test_absent_market_cap_contributes_nothing() {
        let layers = vec![
            (
                "layer1".to_string(),
                vec![
                    quoted("AAA", Some(1000.0), 10.0),
                    quoted("BBB", None, 50.0),
                ],
            ),
            ("layer2".to_string(), vec![]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        let layer1 = &output.index.layers["layer1"];
        assert_eq!(layer1.stock_count, 1);
        assert_eq!(layer1.total_market_cap, 1000.0);
        assert!((layer1.change_percent - 10.0).abs() < 1e-9);
        assert_eq!(output.index.stock_count, 1);

        // The capless stock still appears in the layer list.
        let quotes = &output.stocks["layer1"];
        assert_eq!(quotes.len(), 2);
        let capless = quotes.iter().find(|q| q.ticker == "BBB").unwrap();
        assert_eq!(capless.market_cap, None);
        assert_eq!(capless.market_cap_formatted, "N/A");
        assert!(capless.price.is_some());
    }

    #[test]
    fn test_failed_fetch_yields_degraded_quote_in_place() {
        let layers = vec![
            (
                "layer1".to_string(),
                vec![failed("AAA", "connection refused"), quoted("BBB", Some(500.0), 1.0)],
            ),
            ("layer2".to_string(), vec![]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        let quotes = &output.stocks["layer1"];
        assert_eq!(quotes.len(), 2);
        let degraded = &quotes[0];
        assert_eq!(degraded.ticker, "AAA");
        assert_eq!(degraded.price, None);
        assert_eq!(degraded.market_cap, None);
        assert_eq!(degraded.price_change, 0.0);
        assert_eq!(degraded.direction, Direction::Neutral);
        assert_eq!(degraded.error.as_deref(), Some("connection refused"));

        assert_eq!(output.index.layers["layer1"].stock_count, 1);
    }

    #[test]
    fn test_single_close_is_insufficient_history() {
        let outcome = FetchOutcome {
            info: info("AAA"),
            result: Ok(TickerQuote {
                closes: vec![DailyClose::new(day(1), 50.0)],
                market_cap: Some(1000.0),
            }),
        };
        let layers = vec![
            ("layer1".to_string(), vec![outcome]),
            ("layer2".to_string(), vec![]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        let quote = &output.stocks["layer1"][0];
        assert_eq!(quote.error.as_deref(), Some("insufficient price history"));
        assert_eq!(output.index.stock_count, 0);
        assert_eq!(output.index.total_market_cap_formatted, "N/A");
    }

    #[test]
    fn test_zero_previous_close_degrades_instead_of_dividing() {
        let zero_bar = FetchOutcome {
            info: info("HALT"),
            result: Ok(TickerQuote {
                closes: vec![
                    DailyClose::new(day(1), 0.0),
                    DailyClose::new(day(2), 10.0),
                ],
                market_cap: Some(1_000.0),
            }),
        };
        let layers = vec![
            (
                "layer1".to_string(),
                vec![zero_bar, quoted("AAA", Some(500.0), 2.0)],
            ),
            ("layer2".to_string(), vec![]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        let quotes = &output.stocks["layer1"];
        let halted = quotes.iter().find(|q| q.ticker == "HALT").unwrap();
        assert_eq!(halted.error.as_deref(), Some("non-positive previous close"));
        assert_eq!(halted.price, None);

        // The healthy ticker alone drives a finite index.
        assert_eq!(output.index.stock_count, 1);
        assert!(output.index.change_percent.is_finite());
        assert!((output.index.change_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_price_is_neutral_everywhere() {
        let layers = vec![
            ("layer1".to_string(), vec![quoted("AAA", Some(1000.0), 0.0)]),
            ("layer2".to_string(), vec![]),
            ("layer3".to_string(), vec![]),
            ("layer4".to_string(), vec![]),
        ];
        let output = build_snapshot(&layers, Utc::now());

        assert_eq!(output.stocks["layer1"][0].direction, Direction::Neutral);
        assert_eq!(
            output.index.layers["layer1"].direction,
            Direction::Neutral
        );
        assert_eq!(output.index.direction, Direction::Neutral);
    }
}
