pub mod ema;
pub mod dataset;

pub use dataset::{Dataset, Row};
