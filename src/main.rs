use trade_journal::api::router::create_router;
use trade_journal::config::AppConfig;
use trade_journal::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    db::migrate(&pool).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics()?;

    if !config.has_chart_storage() {
        tracing::warn!("STORAGE_URL is not set, chart image uploads will be rejected");
    }
    if !config.has_market_data() {
        tracing::warn!("MARKET_DATA_API_KEY is not set, intraday bars are unavailable");
    }
    tracing::info!(utc_offset_minutes = config.utc_offset_minutes, "Journal offset configured");

    let state = AppState::new(pool, config, metrics_handle);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
