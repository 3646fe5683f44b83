use chrono::{FixedOffset, Offset, Utc};
use std::env;

const DEFAULT_CHART_BUCKET: &str = "trade-charts";
const DEFAULT_MARKET_DATA_URL: &str = "https://api.polygon.io";
const DEFAULT_MAX_CHART_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Auth backend
    pub auth_jwt_secret: String,

    /// Offset defining the journal's calendar (day, month and year boundaries).
    pub utc_offset_minutes: i32,

    // Object storage for chart images (optional)
    pub storage_url: Option<String>,
    pub storage_service_key: Option<String>,
    pub chart_bucket: String,
    pub max_chart_bytes: usize,

    // Market data lookups (optional)
    pub market_data_api_key: Option<String>,
    pub market_data_url: String,
    pub market_data_calls_per_minute: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            auth_jwt_secret: env::var("AUTH_JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("AUTH_JWT_SECRET must be set"))?,

            utc_offset_minutes: env::var("UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".into())
                .parse()?,

            storage_url: env::var("STORAGE_URL")
                .ok()
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            storage_service_key: env::var("STORAGE_SERVICE_KEY").ok(),
            chart_bucket: env::var("CHART_BUCKET").unwrap_or_else(|_| DEFAULT_CHART_BUCKET.into()),
            max_chart_bytes: env::var("MAX_CHART_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_CHART_BYTES),

            market_data_api_key: env::var("MARKET_DATA_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            market_data_url: env::var("MARKET_DATA_URL")
                .unwrap_or_else(|_| DEFAULT_MARKET_DATA_URL.into()),
            market_data_calls_per_minute: env::var("MARKET_DATA_CALLS_PER_MINUTE")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
        })
    }

    /// Minimal configuration for local runs and tests: no optional collaborators.
    pub fn local(database_url: &str, auth_jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".into(),
            port: 0,
            auth_jwt_secret: auth_jwt_secret.into(),
            utc_offset_minutes: 0,
            storage_url: None,
            storage_service_key: None,
            chart_bucket: DEFAULT_CHART_BUCKET.into(),
            max_chart_bytes: DEFAULT_MAX_CHART_BYTES,
            market_data_api_key: None,
            market_data_url: DEFAULT_MARKET_DATA_URL.into(),
            market_data_calls_per_minute: 5,
        }
    }

    /// The journal's local offset. Out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Returns true if chart images can be uploaded.
    pub fn has_chart_storage(&self) -> bool {
        self.storage_url.is_some()
    }

    /// Returns true if market data lookups are available.
    pub fn has_market_data(&self) -> bool {
        self.market_data_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_minutes() {
        let mut config = AppConfig::local("postgres://localhost/journal", "secret");
        assert_eq!(config.offset().local_minus_utc(), 0);

        config.utc_offset_minutes = -300;
        assert_eq!(config.offset().local_minus_utc(), -5 * 3600);

        config.utc_offset_minutes = 100_000;
        assert_eq!(config.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_optional_collaborators_disabled_locally() {
        let config = AppConfig::local("postgres://localhost/journal", "secret");
        assert!(!config.has_chart_storage());
        assert!(!config.has_market_data());
    }
}
