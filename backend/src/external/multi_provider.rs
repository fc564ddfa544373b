use crate::external::price_provider::{PriceProvider, PriceProviderError};
use async_trait::async_trait;
use tracing::{info, warn};

/// Tries the primary provider and falls back to the second one on any error.
pub struct MultiProvider {
    primary: Box<dyn PriceProvider>,
    fallback: Box<dyn PriceProvider>,
}

impl MultiProvider {
    pub fn new(primary: Box<dyn PriceProvider>, fallback: Box<dyn PriceProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl PriceProvider for MultiProvider {
    async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        match self.primary.fetch_latest_price(symbol).await {
            Ok(price) => return Ok(price),
            Err(PriceProviderError::RateLimited) => {
                info!("Primary provider rate limited for {}, trying fallback", symbol);
            }
            Err(e) => {
                warn!("Primary provider error for {}: {}", symbol, e);
            }
        }

        self.fallback.fetch_latest_price(symbol).await.map_err(|e| {
            warn!("Fallback provider failed for {}: {}", symbol, e);
            e
        })
    }
}
