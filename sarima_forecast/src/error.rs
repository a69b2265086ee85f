//! Error types for the sarima_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the sarima_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The input table is missing columns or holds malformed cells
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Filtering left no usable observations
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// The observations do not form a gap-free monthly series
    #[error("Irregular series: {0}")]
    IrregularSeries(String),

    /// Every candidate order of a search failed to fit
    #[error("No feasible model: all {evaluated} candidate orders failed to fit")]
    NoFeasibleModel { evaluated: usize },

    /// Forecast and actual values are not aligned
    #[error("Length mismatch: forecast has {forecast} values, actual series has {actual}")]
    LengthMismatch { forecast: usize, actual: usize },

    /// Year and month do not name a usable calendar month
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No fitted model has been persisted yet
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// A single requested model could not be fitted
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error while assembling configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from lag-operator calculations
    #[error("Math error: {0}")]
    Math(#[from] series_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from JSON (de)serialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
