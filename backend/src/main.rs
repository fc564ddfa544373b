use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;

use stockfolio_backend::app;
use stockfolio_backend::config::AppConfig;
use stockfolio_backend::db;
use stockfolio_backend::external::alphavantage::AlphaVantageProvider;
use stockfolio_backend::external::multi_provider::MultiProvider;
use stockfolio_backend::external::price_provider::PriceProvider;
use stockfolio_backend::external::twelvedata::TwelveDataProvider;
use stockfolio_backend::logging::init_logging;
use stockfolio_backend::services::failure_cache::FailureCache;
use stockfolio_backend::services::quote_service::QuoteService;
use stockfolio_backend::services::rate_limiter::RateLimiter;
use stockfolio_backend::session::SessionStore;
use stockfolio_backend::state::AppState;

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn PriceProvider>> {
    let client = reqwest::Client::builder()
        .timeout(config.quote_timeout + Duration::from_secs(1))
        .build()
        .context("Failed to build HTTP client")?;

    let alphavantage = |client: reqwest::Client| {
        config
            .alphavantage_api_key
            .clone()
            .map(|key| AlphaVantageProvider::new(client, key))
            .context("ALPHAVANTAGE_API_KEY not set")
    };
    let twelvedata = |client: reqwest::Client| {
        config
            .twelvedata_api_key
            .clone()
            .map(|key| TwelveDataProvider::new(client, key))
            .context("TWELVEDATA_API_KEY not set")
    };

    let provider: Arc<dyn PriceProvider> = match config.price_provider.as_str() {
        "alphavantage" => {
            tracing::info!("Using price provider: Alpha Vantage");
            Arc::new(alphavantage(client)?)
        }
        "twelvedata" => {
            tracing::info!("Using price provider: Twelve Data");
            Arc::new(twelvedata(client)?)
        }
        "multi" => {
            tracing::info!("Using price provider: Twelve Data with Alpha Vantage fallback");
            let primary = Box::new(twelvedata(client.clone())?);
            let fallback = Box::new(alphavantage(client)?);
            Arc::new(MultiProvider::new(primary, fallback))
        }
        other => return Err(anyhow!("Unknown price provider {}", other)),
    };
    Ok(provider)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_logging(&config.log)?;

    let pool = db::connect(&config.database_url, 5)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    db::migrate(&pool).await.context("Failed to run migrations")?;

    let quotes = QuoteService::new(
        build_provider(&config)?,
        Arc::new(RateLimiter::new(config.quote_concurrency, config.quote_requests_per_minute)),
        FailureCache::new(),
        config.quote_timeout,
        config.quote_concurrency,
    );

    let state = AppState {
        pool: pool.clone(),
        sessions: SessionStore::new(),
        quotes,
        secure_cookies: config.session_cookie_secure,
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Stockfolio running at http://{}/", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Stockfolio stopped");
    Ok(())
}
