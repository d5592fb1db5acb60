//! Error types for the simulation engine.
//!
//! Only invariant violations on the inputs are errors. Numerical edge cases
//! (zero-interest loans, no break-even, IRR that does not settle) are
//! reported as values by the services that produce them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {axis}: {value} (must be finite and within ±{limit})")]
    InvalidCoordinate {
        axis: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("invalid capacity: {0} kW (must be finite and > 0)")]
    InvalidCapacity(f64),

    #[error("invalid {name}: {value} (must be a fraction in [0, 1))")]
    InvalidLossFraction { name: &'static str, value: f64 },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config value out of range: {0}")]
    Invalid(String),
}
