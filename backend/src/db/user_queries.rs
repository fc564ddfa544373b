use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::User;

pub async fn create(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password_hash)
         VALUES (?, ?)
         RETURNING id"
    )
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
}

pub async fn fetch_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, last_login
         FROM users
         WHERE username = ?"
    )
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, last_login
         FROM users
         WHERE id = ?"
    )
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_last_login(pool: &SqlitePool, id: i64, at: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count_by_username(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await
}
