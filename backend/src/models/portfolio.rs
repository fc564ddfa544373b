use serde::Serialize;

use crate::models::Position;

/// A stored position together with the quote fetched for this view.
#[derive(Debug, Clone, Serialize)]
pub struct PricedPosition {
    pub position: Position,
    /// Zero when the quote could not be fetched.
    pub current_price: f64,
    pub quote_ok: bool,
}

impl PricedPosition {
    pub fn priced(position: Position, current_price: f64) -> Self {
        Self { position, current_price, quote_ok: true }
    }

    pub fn unpriced(position: Position) -> Self {
        Self { position, current_price: 0.0, quote_ok: false }
    }

    pub fn market_value(&self) -> Option<f64> {
        self.quote_ok
            .then(|| self.current_price * self.position.quantity as f64)
    }

    pub fn gain_loss(&self) -> Option<f64> {
        self.quote_ok.then(|| {
            (self.current_price - self.position.purchase_price) * self.position.quantity as f64
        })
    }
}

/// Everything the portfolio page needs: rows in insertion order and the
/// per-symbol quote errors collected while building them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioView {
    pub rows: Vec<PricedPosition>,
    pub errors: Vec<String>,
}

impl PortfolioView {
    pub fn total_cost(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.position.purchase_price * r.position.quantity as f64)
            .sum()
    }

    /// Market value over the rows that could be priced.
    pub fn total_value(&self) -> f64 {
        self.rows.iter().filter_map(PricedPosition::market_value).sum()
    }
}
