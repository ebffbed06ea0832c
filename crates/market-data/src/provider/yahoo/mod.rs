//! Yahoo Finance quote provider.
//!
//! Daily close series come from the chart API via `yahoo_finance_api`;
//! market caps come from the crumb-authenticated quoteSummary API, which
//! is the only Yahoo endpoint that exposes them.

mod models;

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use log::{debug, warn};
use reqwest::header;
use time::OffsetDateTime;
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{DailyClose, InstrumentSummary};
use crate::provider::QuoteProvider;

use models::YahooQuoteSummaryResponse;

const PROVIDER_ID: &str = "YAHOO";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

lazy_static! {
    /// Global cache for Yahoo authentication crumb
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance quote provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        {
            let guard = YAHOO_CRUMB.read().unwrap();
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }

        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        let client = reqwest::Client::new();

        // Step 1: Get cookie from fc.yahoo.com
        let response = client.get("https://fc.yahoo.com").send().await?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Failed to parse Yahoo cookie".to_string(),
            })?;

        // Step 2: Get crumb using cookie
        let crumb = client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .text()
            .await?;

        let crumb_data = CrumbData { cookie, crumb };

        let mut guard = YAHOO_CRUMB.write().unwrap();
        *guard = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        let mut guard = YAHOO_CRUMB.write().unwrap();
        *guard = None;
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    /// Fetch daily closes between two instants, ordered ascending with at
    /// most one entry per calendar day (the last bar of the day wins).
    async fn fetch_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        let response = self
            .connector
            .get_quote_history(
                symbol,
                Self::chrono_to_offset_datetime(start),
                Self::chrono_to_offset_datetime(end),
            )
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    MarketDataError::SymbolNotFound(symbol.to_string())
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let yahoo_quotes = response.quotes().map_err(|e| match e {
            yahoo::YahooError::NoQuotes => {
                warn!(
                    "No quotes returned for '{}' between {} and {}",
                    symbol,
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
                MarketDataError::NoDataForRange
            }
            other => MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: other.to_string(),
            },
        })?;

        let mut closes: Vec<DailyClose> = Vec::with_capacity(yahoo_quotes.len());
        for q in yahoo_quotes {
            let Some(ts) = Utc.timestamp_opt(q.timestamp as i64, 0).single() else {
                warn!("Skipping quote with invalid timestamp {}", q.timestamp);
                continue;
            };
            let date = ts.date_naive();
            match closes.last_mut() {
                Some(last) if last.date == date => last.close = q.close,
                _ => closes.push(DailyClose::new(date, q.close)),
            }
        }

        if closes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(closes)
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn recent_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(lookback_days));

        debug!("Fetching {}-day close history for {}", lookback_days, symbol);

        self.fetch_closes(symbol, start, end).await
    }

    async fn instrument_summary(
        &self,
        symbol: &str,
    ) -> Result<InstrumentSummary, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=summaryDetail&crumb={}",
            encode(symbol),
            encode(&crumb.crumb)
        );

        debug!("Fetching instrument summary for {}", symbol);

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Yahoo authentication expired".to_string(),
            });
        }

        let data: YahooQuoteSummaryResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Failed to parse quoteSummary response: {}", e),
                })?;

        let detail = data
            .quote_summary
            .result
            .first()
            .and_then(|r| r.summary_detail.as_ref())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        Ok(InstrumentSummary {
            symbol: symbol.to_string(),
            market_cap: detail.market_cap.as_ref().and_then(|c| c.raw),
        })
    }

    async fn closes_in_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, MarketDataError> {
        let start_dt = Utc.from_utc_datetime(
            &start
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| MarketDataError::ValidationFailed {
                    message: format!("Invalid start date: {}", start),
                })?,
        );
        let end_dt = Utc.from_utc_datetime(&end.and_hms_opt(0, 0, 0).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!("Invalid end date: {}", end),
            }
        })?);

        debug!(
            "Fetching close history for {} from {} to {}",
            symbol, start, end
        );

        let mut closes = self.fetch_closes(symbol, start_dt, end_dt).await?;
        // The chart API occasionally returns a bar just outside the window.
        closes.retain(|c| c.date >= start && c.date < end);

        if closes.is_empty() {
            return Err(MarketDataError::NoDataForRange);
        }

        Ok(closes)
    }
}
