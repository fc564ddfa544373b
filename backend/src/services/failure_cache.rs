use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::external::price_provider::PriceProviderError;

/// A recent quote failure for a symbol
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error_type: FailureType,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailureType {
    NotFound,       // Provider does not know the symbol
    RateLimited,    // Provider asked us to back off
}

impl FailureType {
    /// Only failures that will not clear on an immediate retry are cached.
    pub fn from_provider_error(err: &PriceProviderError) -> Option<Self> {
        match err {
            PriceProviderError::NotFound => Some(FailureType::NotFound),
            PriceProviderError::RateLimited => Some(FailureType::RateLimited),
            _ => None,
        }
    }

    fn ttl_seconds(self) -> i64 {
        match self {
            FailureType::NotFound => 15 * 60,
            FailureType::RateLimited => 60,
        }
    }
}

/// Thread-safe record of symbols whose last quote call failed, so a
/// portfolio view does not keep hitting the provider for them
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached failure for `symbol` if it has not expired yet
    pub fn is_failed(&self, symbol: &str) -> Option<FailureInfo> {
        if let Some(entry) = self.cache.get(symbol) {
            let info = entry.value().clone();
            let expiry = info.failed_at + Duration::seconds(info.ttl_seconds);

            if Utc::now() < expiry {
                return Some(info);
            }
            drop(entry); // release the read lock before removing
            self.cache.remove(symbol);
        }
        None
    }

    pub fn record_failure(&self, symbol: &str, error_type: FailureType) {
        self.record_failure_at(symbol, error_type, Utc::now());
    }

    fn record_failure_at(&self, symbol: &str, error_type: FailureType, failed_at: DateTime<Utc>) {
        let info = FailureInfo {
            failed_at,
            error_type,
            ttl_seconds: error_type.ttl_seconds(),
        };
        self.cache.insert(symbol.to_string(), info);
    }

    pub fn clear(&self, symbol: &str) {
        self.cache.remove(symbol);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_records_and_retrieves_failures() {
        let cache = FailureCache::new();

        cache.record_failure("INVALID", FailureType::NotFound);

        let result = cache.is_failed("INVALID");
        assert!(result.is_some());
        assert_eq!(result.unwrap().error_type, FailureType::NotFound);
    }

    #[test]
    fn test_cache_clears_symbol() {
        let cache = FailureCache::new();

        cache.record_failure("TEST", FailureType::NotFound);
        assert!(cache.is_failed("TEST").is_some());

        cache.clear("TEST");
        assert!(cache.is_failed("TEST").is_none());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = FailureCache::new();

        cache.record_failure_at("OLD", FailureType::RateLimited, Utc::now() - Duration::seconds(120));
        assert!(cache.is_failed("OLD").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_only_sticky_errors_are_cacheable() {
        assert_eq!(
            FailureType::from_provider_error(&PriceProviderError::NotFound),
            Some(FailureType::NotFound)
        );
        assert_eq!(
            FailureType::from_provider_error(&PriceProviderError::RateLimited),
            Some(FailureType::RateLimited)
        );
        assert_eq!(
            FailureType::from_provider_error(&PriceProviderError::Network("reset".into())),
            None
        );
    }
}
