use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

/// Runtime settings read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub price_provider: String,
    pub alphavantage_api_key: Option<String>,
    pub twelvedata_api_key: Option<String>,
    pub quote_timeout: Duration,
    pub quote_concurrency: usize,
    pub quote_requests_per_minute: u32,
    pub session_cookie_secure: bool,
    pub log: LogSettings,
}

/// Where log lines go and how much of them.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directives
    pub filter: String,
    pub service_name: String,
    pub environment: String,
    /// Set when Loki shipping is enabled
    pub loki_url: Option<Url>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so parsing can be tested without
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = get("BIND_ADDR", "0.0.0.0:3000");
        let timeout_secs = get("QUOTE_TIMEOUT_SECS", "5");
        let concurrency = get("QUOTE_CONCURRENCY", "4");
        let per_minute = get("QUOTE_REQUESTS_PER_MINUTE", "0");
        let secure = get("SESSION_COOKIE_SECURE", "false");

        let price_provider = get("PRICE_PROVIDER", "alphavantage").to_lowercase();
        if !matches!(price_provider.as_str(), "alphavantage" | "twelvedata" | "multi") {
            bail!(
                "Invalid PRICE_PROVIDER: {}. Must be 'alphavantage', 'twelvedata', or 'multi'",
                price_provider
            );
        }

        let key = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let alphavantage_api_key = key("ALPHAVANTAGE_API_KEY");
        let twelvedata_api_key = key("TWELVEDATA_API_KEY");
        if matches!(price_provider.as_str(), "alphavantage" | "multi") && alphavantage_api_key.is_none() {
            bail!("ALPHAVANTAGE_API_KEY must be set for PRICE_PROVIDER={}", price_provider);
        }
        if matches!(price_provider.as_str(), "twelvedata" | "multi") && twelvedata_api_key.is_none() {
            bail!("TWELVEDATA_API_KEY must be set for PRICE_PROVIDER={}", price_provider);
        }

        let loki_enabled = get("LOKI_ENABLED", "false");
        let loki_enabled: bool = loki_enabled
            .parse()
            .with_context(|| format!("LOKI_ENABLED must be true or false: {}", loki_enabled))?;
        let loki_url = match (loki_enabled, lookup("LOKI_URL")) {
            (false, _) => None,
            (true, None) => bail!("LOKI_ENABLED is true but LOKI_URL is not set"),
            (true, Some(raw)) => Some(Url::parse(&raw).with_context(|| format!("LOKI_URL is not a URL: {}", raw))?),
        };
        let log = LogSettings {
            filter: get("RUST_LOG", "info,tower_http=info,sqlx=warn"),
            service_name: get("SERVICE_NAME", "stockfolio"),
            environment: get("ENVIRONMENT", "development"),
            loki_url,
        };

        let quote_concurrency: usize = concurrency
            .parse()
            .with_context(|| format!("QUOTE_CONCURRENCY is not a number: {}", concurrency))?;
        if quote_concurrency == 0 {
            bail!("QUOTE_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            database_url: get("DATABASE_URL", "sqlite://stockfolio.db"),
            bind_addr: bind_addr
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {}", bind_addr))?,
            price_provider,
            alphavantage_api_key,
            twelvedata_api_key,
            quote_timeout: Duration::from_secs(
                timeout_secs
                    .parse()
                    .with_context(|| format!("QUOTE_TIMEOUT_SECS is not a number: {}", timeout_secs))?,
            ),
            quote_concurrency,
            quote_requests_per_minute: per_minute
                .parse()
                .with_context(|| format!("QUOTE_REQUESTS_PER_MINUTE is not a number: {}", per_minute))?,
            session_cookie_secure: secure
                .parse()
                .with_context(|| format!("SESSION_COOKIE_SECURE must be true or false: {}", secure))?,
            log,
        })
    }
}
