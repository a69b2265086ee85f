//! # Series Math
//!
//! Lag-operator algebra for seasonal ARIMA models.
//! This crate provides the polynomial products behind differencing and
//! (seasonal) AR/MA operators, impulse-response weights for forecast
//! variances, and root-location checks for stationarity and invertibility.

use thiserror::Error;

pub mod polynomial;
pub mod stability;

pub use polynomial::LagPolynomial;
pub use stability::{is_invertible, is_stable, is_stationary};

/// Errors that can occur in lag-operator calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
