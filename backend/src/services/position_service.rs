use std::sync::OnceLock;

use regex::Regex;
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::db;
use crate::errors::AppError;
use crate::models::{AddPositionForm, CreatePosition, Position};

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9.\-^=]{1,15}$").expect("valid symbol regex"))
}

/// Turn the raw form into a checked [`CreatePosition`].
pub fn parse_form(form: &AddPositionForm) -> Result<CreatePosition, AppError> {
    let purchase_price = form
        .purchase_price
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::Validation("Purchase price must be a number".into()))?;
    let quantity = form
        .quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation("Quantity must be a whole number".into()))?;

    validate(&form.symbol, &form.name, purchase_price, quantity)
}

fn validate(symbol: &str, name: &str, purchase_price: f64, quantity: i64) -> Result<CreatePosition, AppError> {
    let symbol = symbol.trim().to_uppercase();
    let name = name.trim();

    if symbol.is_empty() {
        return Err(AppError::Validation("Symbol is required".into()));
    }
    if !symbol_pattern().is_match(&symbol) {
        return Err(AppError::Validation(format!("Invalid symbol: {}", symbol)));
    }
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    if !purchase_price.is_finite() || purchase_price <= 0.0 {
        return Err(AppError::Validation("Purchase price must be > 0".into()));
    }
    if quantity <= 0 {
        return Err(AppError::Validation("Quantity must be > 0".into()));
    }

    Ok(CreatePosition {
        symbol,
        name: name.to_string(),
        purchase_price,
        quantity,
    })
}

pub async fn add_position(
    pool: &SqlitePool,
    owner_id: i64,
    symbol: &str,
    name: &str,
    purchase_price: f64,
    quantity: i64,
) -> Result<i64, AppError> {
    let input = validate(symbol, name, purchase_price, quantity)?;
    create(pool, owner_id, input).await
}

pub async fn create(pool: &SqlitePool, owner_id: i64, input: CreatePosition) -> Result<i64, AppError> {
    match db::position_queries::create(pool, owner_id, &input).await {
        Ok(id) => Ok(id),
        Err(e) => {
            error!("Failed to create position {} for user {}: {:?}", input.symbol, owner_id, e);
            Err(AppError::Store(e))
        }
    }
}

pub async fn list_positions(pool: &SqlitePool, owner_id: i64) -> Result<Vec<Position>, AppError> {
    match db::position_queries::fetch_all(pool, owner_id).await {
        Ok(positions) => Ok(positions),
        Err(e) => Err(AppError::Store(e)),
    }
}

/// Delete scoped to the owner. Deleting an id the owner does not have is a
/// no-op, not an error.
pub async fn delete_position(pool: &SqlitePool, position_id: i64, owner_id: i64) -> Result<(), AppError> {
    let deleted = db::position_queries::delete(pool, position_id, owner_id).await?;
    if deleted == 0 {
        debug!("Delete of position {} by user {} matched no rows", position_id, owner_id);
    }
    Ok(())
}
