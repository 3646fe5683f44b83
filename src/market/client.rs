use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rate_limit::RateLimiter;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API rate limit reached. Please wait a minute before trying again.")]
    RateLimited,

    #[error("{0}")]
    Api(String),

    #[error("No data available for this symbol and date")]
    NoData,
}

/// Raw aggregate as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
struct ApiAggregate {
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
    /// Bar start, milliseconds since the Unix epoch.
    t: i64,
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Option<Vec<ApiAggregate>>,
}

/// One intraday price bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl ApiAggregate {
    fn into_bar(self) -> Option<PriceBar> {
        Some(PriceBar {
            time: DateTime::from_timestamp_millis(self.t)?,
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: self.v,
        })
    }
}

/// Intraday aggregates from a Polygon-compatible market data API.
#[derive(Debug)]
pub struct MarketDataClient {
    http: Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl MarketDataClient {
    pub fn new(http: Client, base_url: String, api_key: String, limiter: RateLimiter) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter,
        }
    }

    /// Calls left in the current rate-limit window.
    pub fn remaining_calls(&self) -> usize {
        self.limiter.remaining()
    }

    /// Fetch 5-minute bars for one trading day.
    pub async fn day_bars(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        if !self.limiter.try_acquire() {
            return Err(MarketDataError::RateLimited);
        }

        let body: AggregatesResponse = self.bars_request(symbol, date).send().await?.json().await?;

        parse_bars(body)
    }

    fn bars_request(&self, symbol: &str, date: NaiveDate) -> RequestBuilder {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/5/minute/{date}/{date}",
            self.base_url, symbol
        );
        self.http.get(&url).query(&[
            ("adjusted", "true"),
            ("sort", "asc"),
            ("limit", "50000"),
            ("apiKey", self.api_key.as_str()),
        ])
    }
}

fn parse_bars(body: AggregatesResponse) -> Result<Vec<PriceBar>, MarketDataError> {
    if body.status.as_deref() == Some("ERROR") {
        let message = body
            .error
            .or(body.message)
            .unwrap_or_else(|| "Failed to fetch stock data".into());
        return Err(MarketDataError::Api(message));
    }

    let bars: Vec<PriceBar> = body
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(ApiAggregate::into_bar)
        .collect();

    if bars.is_empty() {
        return Err(MarketDataError::NoData);
    }
    Ok(bars)
}
