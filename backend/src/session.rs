use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "stockfolio_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Error,
    Message,
}

/// One-time status text shown on the page a redirect lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, text: text.into() }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self { kind: FlashKind::Message, text: text.into() }
    }
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct SessionData {
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
    flash: Option<Flash>,
}

/// Server-side session state keyed by the opaque token in the session cookie.
///
/// Lives in memory for the lifetime of the process; there is no expiry sweep.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionData>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session bound to `user_id` and return its token.
    pub fn start(&self, user_id: i64) -> String {
        self.insert(Some(user_id))
    }

    /// Create a session with no user attached.
    pub fn start_anonymous(&self) -> String {
        self.insert(None)
    }

    fn insert(&self, user_id: Option<i64>) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            SessionData { user_id, created_at: Utc::now(), flash: None },
        );
        token
    }

    /// The user bound to `token`, if the session exists and is authenticated.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        self.sessions.get(token).and_then(|s| s.user_id)
    }

    pub fn exists(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    pub fn destroy(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Replace any pending flash. Returns false when the session is gone.
    pub fn set_flash(&self, token: &str, flash: Flash) -> bool {
        match self.sessions.get_mut(token) {
            Some(mut session) => {
                session.flash = Some(flash);
                true
            }
            None => false,
        }
    }

    /// Remove and return the pending flash.
    pub fn take_flash(&self, token: &str) -> Option<Flash> {
        self.sessions.get_mut(token).and_then(|mut s| s.flash.take())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
