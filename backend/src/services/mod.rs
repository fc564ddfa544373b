pub mod failure_cache;
pub mod password_service;
pub mod position_service;
pub mod quote_service;
pub mod rate_limiter;
pub mod user_service;
