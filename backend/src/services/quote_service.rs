use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{PortfolioView, Position, PricedPosition};
use crate::services::failure_cache::{FailureCache, FailureType};
use crate::services::rate_limiter::RateLimiter;

/// Fetches current prices for portfolio rows.
///
/// Every symbol is fetched independently: its own timeout, its own error
/// boundary. At most `concurrency` calls are in flight per view, and the
/// shared [`RateLimiter`] caps calls across all requests.
#[derive(Clone)]
pub struct QuoteService {
    provider: Arc<dyn PriceProvider>,
    rate_limiter: Arc<RateLimiter>,
    failure_cache: FailureCache,
    timeout: Duration,
    concurrency: usize,
}

impl QuoteService {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        rate_limiter: Arc<RateLimiter>,
        failure_cache: FailureCache,
        timeout: Duration,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            failure_cache,
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub fn failure_cache(&self) -> &FailureCache {
        &self.failure_cache
    }

    /// Current price for `symbol`, or `QuoteUnavailable`.
    pub async fn current_price(&self, symbol: &str) -> Result<f64, AppError> {
        let unavailable = |reason: String| AppError::QuoteUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        if let Some(failure) = self.failure_cache.is_failed(symbol) {
            debug!("Skipping quote for {} - cached failure {:?}", symbol, failure.error_type);
            return Err(unavailable(match failure.error_type {
                FailureType::NotFound => "symbol not found".to_string(),
                FailureType::RateLimited => "quote provider is rate limiting, try again shortly".to_string(),
            }));
        }

        // Waiting on the rate limiter counts against the symbol's timeout
        let result = tokio::time::timeout(self.timeout, async {
            let _guard = self.rate_limiter.acquire().await;
            self.provider.fetch_latest_price(symbol).await
        })
        .await;

        match result {
            Ok(Ok(price)) if price.is_finite() && price > 0.0 => {
                self.failure_cache.clear(symbol);
                Ok(price)
            }
            Ok(Ok(price)) => Err(unavailable(format!("provider returned invalid price {}", price))),
            Ok(Err(e)) => {
                if let Some(failure_type) = FailureType::from_provider_error(&e) {
                    self.failure_cache.record_failure(symbol, failure_type);
                }
                Err(unavailable(e.to_string()))
            }
            Err(_) => Err(unavailable(format!("timed out after {}s", self.timeout.as_secs_f32()))),
        }
    }

    /// Price every position. Rows come back in input order; a failed quote
    /// leaves its row at price zero and adds a line to `errors`.
    pub async fn enrich(&self, positions: Vec<Position>) -> PortfolioView {
        let results: Vec<(PricedPosition, Option<String>)> = stream::iter(positions)
            .map(|position| async move {
                match self.current_price(&position.symbol).await {
                    Ok(price) => (PricedPosition::priced(position, price), None),
                    Err(e) => {
                        warn!("Quote failed for {}: {}", position.symbol, e);
                        let reason = match &e {
                            AppError::QuoteUnavailable { reason, .. } => reason.clone(),
                            other => other.to_string(),
                        };
                        let message = format!("{}: {}", position.symbol, reason);
                        (PricedPosition::unpriced(position), Some(message))
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut view = PortfolioView::default();
        for (row, error) in results {
            view.rows.push(row);
            view.errors.extend(error);
        }
        view
    }
}
