pub mod position;
pub mod portfolio;

pub use portfolio::{Portfolio, PortfolioSnapshot, PortfolioState};
pub use position::Position;
