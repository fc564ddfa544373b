use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// A holding of one stock owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub name: String,
    pub purchase_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePosition {
    pub symbol: String,
    pub name: String,
    pub purchase_price: f64,
    pub quantity: i64,
}

/// Raw `/addPosition` form. Numbers arrive as text and are checked by the
/// position service.
#[derive(Debug, Default, Deserialize)]
pub struct AddPositionForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purchase_price: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePositionForm {
    #[serde(default)]
    pub id: String,
}
