pub mod client;
pub mod rate_limit;

pub use client::{MarketDataClient, MarketDataError, PriceBar};
pub use rate_limit::RateLimiter;
