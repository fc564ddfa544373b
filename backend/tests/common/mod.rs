#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use stockfolio_backend::app::create_app;
use stockfolio_backend::db;
use stockfolio_backend::external::price_provider::{PriceProvider, PriceProviderError};
use stockfolio_backend::services::failure_cache::FailureCache;
use stockfolio_backend::services::quote_service::QuoteService;
use stockfolio_backend::services::rate_limiter::RateLimiter;
use stockfolio_backend::session::{SessionStore, SESSION_COOKIE};
use stockfolio_backend::state::AppState;

/// Prices known symbols, reports everything else as unknown.
pub struct StubProvider {
    prices: HashMap<String, f64>,
}

#[async_trait]
impl PriceProvider for StubProvider {
    async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, PriceProviderError> {
        self.prices.get(symbol).copied().ok_or(PriceProviderError::NotFound)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new(prices: &[(&str, f64)]) -> Self {
        let pool = db::in_memory().await.expect("in-memory database");
        let provider = StubProvider {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        };
        let quotes = QuoteService::new(
            Arc::new(provider),
            Arc::new(RateLimiter::new(4, 0)),
            FailureCache::new(),
            Duration::from_secs(2),
            4,
        );
        let state = AppState {
            pool,
            sessions: SessionStore::new(),
            quotes,
            secure_cookies: false,
        };
        Self { router: create_app(state.clone()), state }
    }

    /// A browser with its own cookie.
    pub fn browser(&self) -> Browser {
        Browser { router: self.router.clone(), cookie: None }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Vec<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert!(self.status.is_redirection(), "expected redirect, got {}", self.status);
        assert_eq!(self.location.as_deref(), Some(to));
    }

    /// Rows in the rendered portfolio table.
    pub fn position_rows(&self) -> usize {
        self.body.matches("class=\"position\"").count()
    }
}

pub struct Browser {
    router: Router,
    pub cookie: Option<String>,
}

impl Browser {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, body: &str) -> TestResponse {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form(
            "/register",
            &format!("username={}&password={}&confirm_password={}", username, password, password),
        )
        .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &format!("username={}&password={}", username, password))
            .await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.cookie {
            Some(token) => builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token)),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();

        let prefix = format!("{}=", SESSION_COOKIE);
        for cookie in &set_cookie {
            if let Some(rest) = cookie.strip_prefix(&prefix) {
                let token = rest.split(';').next().unwrap_or_default();
                self.cookie = Some(token.to_string());
            }
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
