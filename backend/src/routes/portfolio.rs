use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use crate::middleware::{CurrentUser, SessionContext};
use crate::models::{AddPositionForm, DeletePositionForm, PortfolioView};
use crate::routes::{form_input, redirect_with, restart_session};
use crate::services::{position_service, user_service};
use crate::session::Flash;
use crate::state::AppState;
use crate::views;

/// Routes that sit behind `require_auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/portfolio", get(show_portfolio))
        .route("/addPosition", post(add_position))
        .route("/deletePosition", post(delete_position))
}

pub async fn landing() -> Redirect {
    Redirect::to("/portfolio")
}

pub async fn show_portfolio(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Response {
    info!("GET /portfolio - Loading portfolio for user {}", user.id);

    let account = match user_service::find_by_id(&state.pool, user.id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            // The session outlived its user row
            warn!("Session for unknown user {}, logging out", user.id);
            return restart_session(&state, jar, &session.token, "/login", Flash::error("Please log in again"));
        }
        Err(e) => {
            // Without the account the page cannot render; /login needs no store
            error!("Failed to load user {}: {}", user.id, e);
            return restart_session(&state, jar, &session.token, "/login", Flash::error(e.user_message()));
        }
    };

    let mut flash = state.sessions.take_flash(&session.token);

    let view = match position_service::list_positions(&state.pool, user.id).await {
        Ok(positions) => state.quotes.enrich(positions).await,
        Err(e) => {
            error!("Failed to list positions for user {}: {}", user.id, e);
            flash = Some(Flash::error(e.user_message()));
            PortfolioView::default()
        }
    };
    if !view.errors.is_empty() {
        warn!("Portfolio for user {} rendered with {} quote errors", user.id, view.errors.len());
    }

    Html(views::portfolio_page(&account.username, &view, flash.as_ref())).into_response()
}

pub async fn add_position(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<AddPositionForm>, FormRejection>,
) -> Redirect {
    info!("POST /addPosition - Adding position for user {}", user.id);

    let input = form_input(form).and_then(|form| position_service::parse_form(&form));
    let result = match input {
        Ok(input) => position_service::create(&state.pool, user.id, input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(id) => {
            info!("Created position {} for user {}", id, user.id);
            redirect_with(&state, &session.token, "/portfolio", Flash::message("Position added"))
        }
        Err(e) => {
            warn!("Add position rejected for user {}: {}", user.id, e);
            redirect_with(&state, &session.token, "/portfolio", Flash::error(e.user_message()))
        }
    }
}

pub async fn delete_position(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<DeletePositionForm>, FormRejection>,
) -> Redirect {
    let form = match form_input(form) {
        Ok(form) => form,
        Err(e) => return redirect_with(&state, &session.token, "/portfolio", Flash::error(e.user_message())),
    };
    info!("POST /deletePosition - Deleting {} for user {}", form.id, user.id);

    let Ok(position_id) = form.id.trim().parse::<i64>() else {
        return redirect_with(&state, &session.token, "/portfolio", Flash::error("Invalid position id"));
    };

    match position_service::delete_position(&state.pool, position_id, user.id).await {
        Ok(()) => redirect_with(&state, &session.token, "/portfolio", Flash::message("Position deleted")),
        Err(e) => {
            error!("Failed to delete position {} for user {}: {}", position_id, user.id, e);
            redirect_with(&state, &session.token, "/portfolio", Flash::error(e.user_message()))
        }
    }
}
