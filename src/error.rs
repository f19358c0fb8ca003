use thiserror::Error;
use crate::types::rate::RateKind;

#[derive(Error, Debug)]
pub enum Error {
    // Ledger Errors
    #[error("{}: rate={rate}, allowed range is [0, 1]", .kind.limit_message())]
    InvalidRate {
        kind: RateKind,
        rate: f64,
    },

    #[error("Insufficient position: requested={requested}, available={available}")]
    InsufficientPosition {
        requested: f64,
        available: f64,
    },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Invalid initial balance: {0}")]
    InvalidInitialBalance(f64),

    #[error("Invalid leverage: {0}, must be >= 1")]
    InvalidLeverage(f64),

    // Invariant Errors
    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),

    // Market Data Errors
    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Simulation Errors
    #[error("Episode finished, call reset before stepping")]
    EpisodeFinished,

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    // Arithmetic Errors
    #[error("Division by zero")]
    DivisionByZero,

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub details: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.details)
    }
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Error::MetricsError(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::ConfigError(e.to_string())
    }
}
