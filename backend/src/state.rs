use sqlx::SqlitePool;

use crate::services::quote_service::QuoteService;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub quotes: QuoteService,
    pub secure_cookies: bool,
}
