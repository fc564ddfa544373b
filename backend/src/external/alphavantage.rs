use crate::external::price_provider::{parse_price, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

const BASE_URL: &str = "https://www.alphavantage.co/query";

pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key, base_url: BASE_URL.to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct AvGlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<HashMap<String, String>>,

    // Throttled: { "Note": "Thank you for using Alpha Vantage! ..." }
    #[serde(rename = "Note")]
    note: Option<String>,

    // Daily quota exhausted on the free tier
    #[serde(rename = "Information")]
    information: Option<String>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

/// Extract `"05. price"` from a `GLOBAL_QUOTE` body.
fn parse_global_quote(body: &str) -> Result<f64, PriceProviderError> {
    let parsed: AvGlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| PriceProviderError::Parse(e.to_string()))?;

    if parsed.note.is_some() || parsed.information.is_some() {
        return Err(PriceProviderError::RateLimited);
    }
    if let Some(msg) = parsed.error_message {
        return Err(PriceProviderError::BadResponse(msg));
    }

    let quote = parsed
        .global_quote
        .ok_or_else(|| PriceProviderError::BadResponse("missing Global Quote".into()))?;

    // Unknown symbols come back as an empty object
    if quote.is_empty() {
        return Err(PriceProviderError::NotFound);
    }

    let price = quote
        .get("05. price")
        .ok_or_else(|| PriceProviderError::BadResponse("missing price field".into()))?;
    parse_price(price)
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(format!("HTTP {}", resp.status())));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        parse_global_quote(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_price() {
        let body = r#"{"Global Quote": {"01. symbol": "IBM", "05. price": "183.2500", "07. latest trading day": "2024-05-01"}}"#;
        assert_eq!(parse_global_quote(body).unwrap(), 183.25);
    }

    #[test]
    fn test_empty_quote_is_not_found() {
        let body = r#"{"Global Quote": {}}"#;
        assert!(matches!(parse_global_quote(body), Err(PriceProviderError::NotFound)));
    }

    #[test]
    fn test_note_is_rate_limited() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"}"#;
        assert!(matches!(parse_global_quote(body), Err(PriceProviderError::RateLimited)));

        let body = r#"{"Information": "We have detected your API key and our standard API rate limit is 25 requests per day."}"#;
        assert!(matches!(parse_global_quote(body), Err(PriceProviderError::RateLimited)));
    }

    #[test]
    fn test_missing_price_field() {
        let body = r#"{"Global Quote": {"01. symbol": "IBM"}}"#;
        assert!(matches!(parse_global_quote(body), Err(PriceProviderError::BadResponse(_))));
    }

    #[test]
    fn test_garbage_body() {
        assert!(matches!(parse_global_quote("<html>"), Err(PriceProviderError::Parse(_))));
    }
}
