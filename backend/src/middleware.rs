use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Extension;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::session::{Flash, SESSION_COOKIE};
use crate::state::AppState;

/// Session token of the current request, set by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
}

/// The authenticated user, set by [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Make sure every request carries a known session.
///
/// A request without a cookie, or with a token the store no longer knows,
/// gets a fresh anonymous session. The cookie is only sent when the session
/// still exists after the handler ran; handlers that rotate the token set
/// their own cookie.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| state.sessions.exists(token));

    let (token, created) = match existing {
        Some(token) => (token, false),
        None => (state.sessions.start_anonymous(), true),
    };

    request.extensions_mut().insert(SessionContext { token: token.clone() });
    let response = next.run(request).await;

    if created && state.sessions.exists(&token) {
        let jar = jar.add(session_cookie(token, state.secure_cookies));
        (jar, response).into_response()
    } else {
        response
    }
}

/// Gate for routes that need a logged-in user. Anonymous sessions are sent
/// to the login page.
pub async fn require_auth(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.sessions.resolve(&session.token) {
        Some(user_id) => {
            request.extensions_mut().insert(CurrentUser { id: user_id });
            next.run(request).await
        }
        None => {
            debug!("Unauthenticated request to {}, redirecting to /login", request.uri().path());
            state.sessions.set_flash(&session.token, Flash::error("Please log in first"));
            Redirect::to("/login").into_response()
        }
    }
}
