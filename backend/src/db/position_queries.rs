use sqlx::SqlitePool;

use crate::models::{CreatePosition, Position};

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    input: &CreatePosition,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO positions (user_id, symbol, name, purchase_price, quantity)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id"
    )
        .bind(user_id)
        .bind(&input.symbol)
        .bind(&input.name)
        .bind(input.purchase_price)
        .bind(input.quantity)
        .fetch_one(pool)
        .await
}

pub async fn fetch_all(pool: &SqlitePool, user_id: i64) -> Result<Vec<Position>, sqlx::Error> {
    sqlx::query_as::<_, Position>(
        "SELECT id, user_id, symbol, name, purchase_price, quantity
         FROM positions
         WHERE user_id = ?
         ORDER BY id"
    )
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM positions WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
