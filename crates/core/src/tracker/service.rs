use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;

use stackindex_market_data::QuoteProvider;

use crate::config::IndexConfig;
use crate::errors::Result;
use crate::history::{HistoricalEntry, HistoryLog};
use crate::index::{build_snapshot, FetchOutcome, IndexSnapshot, StockQuote, TickerQuote};
use crate::ratios::{extension_window, merge_series, LayerRatioPoint, RatioSeriesBuilder};
use crate::store::SeriesStore;

/// Lookback for the per-cycle close fetch. Five calendar days is enough
/// to always cover the two most recent trading days, weekends included.
pub const RECENT_CLOSES_LOOKBACK_DAYS: u32 = 5;

/// Everything a "what is the index right now" query returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentView {
    pub stocks: BTreeMap<String, Vec<StockQuote>>,
    pub index: Option<IndexSnapshot>,
}

#[derive(Debug, Default)]
struct TrackerState {
    stocks: BTreeMap<String, Vec<StockQuote>>,
    index: Option<IndexSnapshot>,
    history: HistoryLog,
    ratios: Vec<LayerRatioPoint>,
}

/// Owns all mutable tracker state behind one mutex. The lock is only
/// taken after every network call of a cycle has completed, and never
/// held across an await point, so readers see either the previous
/// consistent state or the new one.
pub struct TrackerService {
    config: IndexConfig,
    provider: Arc<dyn QuoteProvider>,
    history_store: Arc<dyn SeriesStore<HistoricalEntry>>,
    ratio_store: Arc<dyn SeriesStore<LayerRatioPoint>>,
    state: Mutex<TrackerState>,
}

impl TrackerService {
    /// Build the service, rehydrating history from its store. A store
    /// that fails to load degrades to an empty series rather than
    /// preventing startup.
    pub fn new(
        config: IndexConfig,
        provider: Arc<dyn QuoteProvider>,
        history_store: Arc<dyn SeriesStore<HistoricalEntry>>,
        ratio_store: Arc<dyn SeriesStore<LayerRatioPoint>>,
    ) -> Self {
        let history = match history_store.load() {
            Ok(entries) => {
                info!("Loaded {} historical entries", entries.len());
                HistoryLog::from_entries(entries)
            }
            Err(e) => {
                warn!("Failed to load history, starting empty: {}", e);
                HistoryLog::new()
            }
        };

        TrackerService {
            config,
            provider,
            history_store,
            ratio_store,
            state: Mutex::new(TrackerState {
                history,
                ..TrackerState::default()
            }),
        }
    }

    pub fn update_interval_minutes(&self) -> u64 {
        self.config.scheduler.update_interval_minutes
    }

    /// Run one full fetch-and-aggregate cycle. Per-ticker failures are
    /// captured in the snapshot; only after everything is fetched does
    /// the state swap happen.
    pub async fn run_update_cycle(&self) {
        let started = Utc::now();
        info!("Starting update cycle");

        let mut layers: Vec<(String, Vec<FetchOutcome>)> = Vec::new();
        for layer in &self.config.layers {
            let mut outcomes = Vec::with_capacity(layer.stocks.len());
            for stock in &layer.stocks {
                let result = self.fetch_ticker(&stock.ticker).await;
                if let Err(reason) = &result {
                    warn!("Fetch failed for {}: {}", stock.ticker, reason);
                }
                outcomes.push(FetchOutcome {
                    info: stock.clone(),
                    result,
                });
            }
            layers.push((layer.name.clone(), outcomes));
        }

        let now = Utc::now();
        let output = build_snapshot(&layers, now);
        let entry = HistoricalEntry::from_cycle(now, output.index.clone(), &output.stocks);

        let entries_snapshot;
        {
            let mut state = self.state.lock().unwrap();
            state.stocks = output.stocks;
            state.index = Some(output.index);
            state.history.append(entry);
            entries_snapshot = state.history.entries().to_vec();
        }

        // Persistence is best effort; in-memory state is already updated.
        if let Err(e) = self.history_store.save(&entries_snapshot) {
            error!("Failed to persist history: {}", e);
        }

        info!(
            "Update cycle finished in {}ms",
            (Utc::now() - started).num_milliseconds()
        );
    }

    /// Fetch closes and market cap for one ticker. Any error becomes a
    /// display string so the cycle can record it without aborting.
    async fn fetch_ticker(&self, ticker: &str) -> std::result::Result<TickerQuote, String> {
        let closes = self
            .provider
            .recent_closes(ticker, RECENT_CLOSES_LOOKBACK_DAYS)
            .await
            .map_err(|e| e.to_string())?;
        let summary = self
            .provider
            .instrument_summary(ticker)
            .await
            .map_err(|e| e.to_string())?;
        Ok(TickerQuote {
            closes,
            market_cap: summary.market_cap,
        })
    }

    /// Extend the cached layer-ratio series up to yesterday.
    pub async fn extend_ratio_history(&self) -> Result<()> {
        self.extend_ratio_history_as_of(Utc::now().date_naive())
            .await
    }

    /// Incremental extension with an explicit "today". Cold start covers
    /// the full lookback; warm start resumes the day after the last
    /// cached point; an up-to-date cache is adopted as-is without a
    /// single provider call or rewrite.
    pub async fn extend_ratio_history_as_of(&self, today: NaiveDate) -> Result<()> {
        let cached = match self.ratio_store.load() {
            Ok(points) => points,
            Err(e) => {
                warn!("Failed to load ratio cache, starting empty: {}", e);
                Vec::new()
            }
        };

        let last_cached = cached.last().map(|p| p.date);
        let Some((start, end)) = extension_window(last_cached, today) else {
            debug!("Ratio series already up to date");
            self.state.lock().unwrap().ratios = cached;
            return Ok(());
        };
        info!("Extending ratio series from {} to {}", start, end);

        let mut builder = RatioSeriesBuilder::new();
        for (layer_idx, layer) in self.config.layers.iter().enumerate() {
            for stock in &layer.stocks {
                let closes = match self
                    .provider
                    .closes_in_range(&stock.ticker, start, end)
                    .await
                {
                    Ok(closes) => closes,
                    Err(e) => {
                        warn!("Skipping {} in ratio extension: {}", stock.ticker, e);
                        continue;
                    }
                };
                let market_cap = match self.provider.instrument_summary(&stock.ticker).await {
                    Ok(summary) => summary.market_cap,
                    Err(e) => {
                        warn!("Skipping {} in ratio extension: {}", stock.ticker, e);
                        continue;
                    }
                };
                let Some(market_cap) = market_cap else {
                    debug!("No market cap for {}, skipping in ratio extension", stock.ticker);
                    continue;
                };
                builder.add_series(layer_idx, market_cap, &closes);
            }
        }

        let fresh = builder.build();
        info!("Computed {} new ratio points", fresh.len());
        let merged = merge_series(cached, fresh);

        self.state.lock().unwrap().ratios = merged.clone();
        self.ratio_store.save(&merged)?;
        Ok(())
    }

    pub fn current(&self) -> CurrentView {
        let state = self.state.lock().unwrap();
        CurrentView {
            stocks: state.stocks.clone(),
            index: state.index.clone(),
        }
    }

    pub fn history(&self) -> Vec<HistoricalEntry> {
        self.state.lock().unwrap().history.entries().to_vec()
    }

    pub fn layer_ratios(&self) -> Vec<LayerRatioPoint> {
        self.state.lock().unwrap().ratios.clone()
    }
}

