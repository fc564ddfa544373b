use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{require_auth, session_middleware};
use crate::routes::{auth, health, portfolio};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let protected = portfolio::router()
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Health probes and unknown paths are added after the session layer so
    // they never open a session
    Router::<AppState>::new()
        .merge(auth::router())
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .merge(health::router())
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
