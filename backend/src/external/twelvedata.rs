use crate::external::price_provider::{parse_price, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use serde::Deserialize;

const BASE_URL: &str = "https://api.twelvedata.com";

pub struct TwelveDataProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TwelveDataProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key, base_url: BASE_URL.to_string() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(f64),
}

#[derive(Debug, Deserialize)]
struct TwelveDataPriceResponse {
    price: Option<RawPrice>,

    // Error handling
    status: Option<String>,
    message: Option<String>,
    code: Option<u32>,
}

/// Extract the price from a `/price` body.
fn parse_price_response(body: &str) -> Result<f64, PriceProviderError> {
    let parsed: TwelveDataPriceResponse =
        serde_json::from_str(body).map_err(|e| PriceProviderError::Parse(e.to_string()))?;

    if parsed.status.as_deref() == Some("error") || parsed.code.is_some() {
        let message = parsed.message.unwrap_or_default();
        return Err(match parsed.code {
            Some(429) => PriceProviderError::RateLimited,
            Some(400) | Some(404) => PriceProviderError::NotFound,
            code => PriceProviderError::BadResponse(format!("code {:?}: {}", code, message)),
        });
    }

    match parsed.price {
        Some(RawPrice::Text(raw)) => parse_price(&raw),
        Some(RawPrice::Number(n)) if n.is_finite() => Ok(n),
        Some(RawPrice::Number(n)) => Err(PriceProviderError::Parse(format!("non-finite price {}", n))),
        None => Err(PriceProviderError::BadResponse("missing price field".into())),
    }
}

#[async_trait]
impl PriceProvider for TwelveDataProvider {
    async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        let url = format!("{}/price", self.base_url);

        let resp = self
            .client
            .get(url)
            .query(&[("symbol", symbol), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        parse_price_response(&body)
    }
}
