//! Seasonal ARIMA models and their forecasts

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod order;
pub mod sarima;

pub use order::{ArimaOrder, OrderCandidate, SearchGrid, SeasonalOrder};
pub use sarima::{CandidateFitFailure, FitOptions, SarimaModel, SarimaParameters};

/// Forecast aligned with a test series, plus its mean absolute error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Month of each forecast value
    dates: Vec<NaiveDate>,
    /// Forecasted values
    values: Vec<f64>,
    /// Mean absolute error against the actual values
    mean_absolute_error: f64,
    /// Confidence intervals (optional)
    intervals: Option<Vec<(f64, f64)>>,
}

impl ForecastResult {
    /// Create a forecast result, scoring `values` against `actual`
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>, actual: &[f64]) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::LengthMismatch {
                forecast: values.len(),
                actual: dates.len(),
            });
        }

        let mean_absolute_error = crate::metrics::mean_absolute_error(&values, actual)?;

        Ok(Self {
            dates,
            values,
            mean_absolute_error,
            intervals: None,
        })
    }

    /// Attach confidence intervals, one per forecast value
    pub fn with_intervals(mut self, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if intervals.len() != self.values.len() {
            return Err(ForecastError::LengthMismatch {
                forecast: self.values.len(),
                actual: intervals.len(),
            });
        }

        self.intervals = Some(intervals);
        Ok(self)
    }

    /// Get the forecast months
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of forecast steps
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the forecast is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean absolute error against the test series
    pub fn mean_absolute_error(&self) -> f64 {
        self.mean_absolute_error
    }

    /// Get the confidence intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }
}
