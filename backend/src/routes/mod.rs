pub mod auth;
pub mod health;
pub mod portfolio;

use axum::extract::rejection::FormRejection;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::errors::AppError;
use crate::middleware::session_cookie;
use crate::session::Flash;
use crate::state::AppState;

/// Redirect to `to`, leaving `flash` in the session for the next page.
pub(crate) fn redirect_with(state: &AppState, token: &str, to: &str, flash: Flash) -> Redirect {
    state.sessions.set_flash(token, flash);
    Redirect::to(to)
}

/// End the session behind `token` and redirect to `to` on a fresh anonymous
/// session carrying `flash`.
pub(crate) fn restart_session(state: &AppState, jar: CookieJar, token: &str, to: &str, flash: Flash) -> Response {
    state.sessions.destroy(token);

    let token = state.sessions.start_anonymous();
    state.sessions.set_flash(&token, flash);
    let jar = jar.add(session_cookie(token, state.secure_cookies));
    (jar, Redirect::to(to)).into_response()
}

/// Unwrap a form extractor, turning a body that does not deserialize into a
/// validation error.
pub(crate) fn form_input<T>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    match form {
        Ok(Form(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected form body: {}", rejection.body_text());
            Err(AppError::Validation("Invalid form submission".to_string()))
        }
    }
}
