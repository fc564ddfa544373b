use http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;

/// Message shown to the user for failures we do not want to explain.
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Username is already taken")]
    DuplicateUsername,
    #[error("Invalid username or password")]
    Authentication,
    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },
    #[error("Database error: {0}")]
    Store(sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Text safe to put in front of the end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(_) | AppError::Internal(_) => GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::DuplicateUsername => (StatusCode::CONFLICT, "Username is already taken").into_response(),
            AppError::Authentication => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            AppError::QuoteUnavailable { symbol, .. } => {
                (StatusCode::BAD_GATEWAY, format!("Quote unavailable for {}", symbol)).into_response()
            }
            AppError::Store(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE).into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Store(value)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(value: tokio::task::JoinError) -> Self {
        AppError::Internal(value.to_string())
    }
}
