pub mod side;
pub mod rate;

pub use side::Side;
pub use rate::RateKind;
