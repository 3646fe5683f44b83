pub mod api;
pub mod backend;
pub mod config;
pub mod db;
pub mod errors;
pub mod market;
pub mod metrics;
pub mod models;
pub mod services;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::backend::{AccessTokenVerifier, ChartStorage};
use crate::config::AppConfig;
use crate::market::{MarketDataClient, RateLimiter};
use crate::services::RefreshSequencer;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub verifier: AccessTokenVerifier,
    pub charts: Option<ChartStorage>,
    pub market: Option<Arc<MarketDataClient>>,
    pub refresh: RefreshSequencer,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Wire collaborators from configuration. Optional ones stay `None`
    /// when their settings are absent.
    pub fn new(db: sqlx::PgPool, config: AppConfig, metrics_handle: PrometheusHandle) -> Self {
        let http = reqwest::Client::new();

        let charts = config.storage_url.clone().map(|url| {
            ChartStorage::new(
                http.clone(),
                url,
                config.chart_bucket.clone(),
                config.storage_service_key.clone(),
                config.max_chart_bytes,
            )
        });

        let market = config.market_data_api_key.clone().map(|key| {
            Arc::new(MarketDataClient::new(
                http.clone(),
                config.market_data_url.clone(),
                key,
                RateLimiter::per_minute(config.market_data_calls_per_minute),
            ))
        });

        Self {
            db,
            verifier: AccessTokenVerifier::new(&config.auth_jwt_secret),
            config,
            charts,
            market,
            refresh: RefreshSequencer::new(),
            metrics_handle,
        }
    }

    /// Current instant in the journal's local offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.config.offset())
    }
}
