use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::middleware::{session_cookie, SessionContext};
use crate::models::{LoginForm, RegisterForm};
use crate::routes::{form_input, redirect_with, restart_session};
use crate::services::user_service;
use crate::session::Flash;
use crate::state::AppState;
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

pub async fn register_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Html<String> {
    let flash = state.sessions.take_flash(&session.token);
    Html(views::register_page(flash.as_ref()))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Redirect {
    let result = match form_input(form) {
        Ok(form) => {
            info!("POST /register - Registering {}", form.username.trim());
            user_service::register(&state.pool, form).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => redirect_with(
            &state,
            &session.token,
            "/login",
            Flash::message("Registration successful, please log in"),
        ),
        Err(e) => {
            match &e {
                AppError::Store(_) | AppError::Internal(_) => error!("Registration failed: {}", e),
                _ => warn!("Registration rejected: {}", e),
            }
            redirect_with(&state, &session.token, "/register", Flash::error(e.user_message()))
        }
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Html<String> {
    let flash = state.sessions.take_flash(&session.token);
    Html(views::login_page(flash.as_ref()))
}

pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Response {
    let result = match form_input(form) {
        Ok(form) => {
            info!("POST /login - Login attempt for {}", form.username.trim());
            user_service::authenticate(&state.pool, form).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(user) => {
            // New token on login so an anonymous token cannot be carried over
            state.sessions.destroy(&session.token);
            let token = state.sessions.start(user.id);
            info!("User {} logged in", user.id);
            let jar = jar.add(session_cookie(token, state.secure_cookies));
            (jar, Redirect::to("/portfolio")).into_response()
        }
        Err(e) => {
            match &e {
                AppError::Authentication | AppError::Validation(_) => warn!("Login failed: {}", e),
                _ => error!("Login failed: {}", e),
            }
            redirect_with(&state, &session.token, "/login", Flash::error(e.user_message())).into_response()
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Response {
    info!("GET /logout - Ending session");
    restart_session(&state, jar, &session.token, "/login", Flash::message("You have been logged out"))
}
