mod portfolio;
mod position;
mod user;

pub use portfolio::{PortfolioView, PricedPosition};
pub use position::{AddPositionForm, CreatePosition, DeletePositionForm, Position};
pub use user::{LoginForm, RegisterForm, User};
