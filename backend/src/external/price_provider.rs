use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("symbol not found")]
    NotFound,

    #[error("rate limited")]
    RateLimited,
}

/// A source of current stock prices.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, PriceProviderError>;
}

/// Parse a price the way the quote APIs send it: a JSON string or number.
pub(crate) fn parse_price(raw: &str) -> Result<f64, PriceProviderError> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| PriceProviderError::Parse(format!("{}: {:?}", e, raw)))?;
    if !price.is_finite() {
        return Err(PriceProviderError::Parse(format!("non-finite price {:?}", raw)));
    }
    Ok(price)
}
