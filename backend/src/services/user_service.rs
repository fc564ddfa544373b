use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::{LoginForm, RegisterForm, User};
use crate::services::password_service;

/// Insert a user row. Usernames are matched exactly (case-sensitive).
pub async fn create_user(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<i64, AppError> {
    if find_by_username(pool, username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    match db::user_queries::create(pool, username, password_hash).await {
        Ok(id) => Ok(id),
        // lost a race with a concurrent registration
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::DuplicateUsername),
        Err(e) => {
            error!("Failed to create user {}: {:?}", username, e);
            Err(AppError::Store(e))
        }
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    Ok(db::user_queries::fetch_by_username(pool, username).await?)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    Ok(db::user_queries::fetch_one(pool, id).await?)
}

pub async fn record_login(pool: &SqlitePool, user_id: i64, at: DateTime<Utc>) -> Result<(), AppError> {
    db::user_queries::update_last_login(pool, user_id, at).await?;
    Ok(())
}

/// Validate a registration form, hash the password and create the user.
pub async fn register(pool: &SqlitePool, form: RegisterForm) -> Result<i64, AppError> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if form.password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    if form.password != form.confirm_password {
        return Err(AppError::Validation("Passwords do not match".into()));
    }

    // Checked before hashing so a taken name fails fast. This also tells the
    // caller which names exist.
    if find_by_username(pool, username).await?.is_some() {
        warn!("Registration rejected, username {} is taken", username);
        return Err(AppError::DuplicateUsername);
    }

    let digest = password_service::hash_blocking(form.password).await?;
    let id = create_user(pool, username, &digest).await?;
    info!("Registered user {} with id {}", username, id);
    Ok(id)
}

/// Check credentials and stamp `last_login`. Returns the authenticated user.
pub async fn authenticate(pool: &SqlitePool, form: LoginForm) -> Result<User, AppError> {
    let username = form.username.trim();
    // Unknown users return without running the hasher.
    let Some(mut user) = find_by_username(pool, username).await? else {
        return Err(AppError::Authentication);
    };

    if !password_service::verify_blocking(form.password, user.password_hash.clone()).await? {
        return Err(AppError::Authentication);
    }

    let now = Utc::now();
    record_login(pool, user.id, now).await?;
    user.last_login = Some(now);
    Ok(user)
}
