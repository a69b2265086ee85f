//! Forecast evaluation against held-out data

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastResult, SarimaModel};
use statrs::distribution::{ContinuousCDF, Normal};

/// Forecast `test.len()` months past the training data and score it against `test`
pub fn evaluate(model: &SarimaModel, test: &MonthlySeries) -> Result<ForecastResult> {
    let values = model.forecast(test.len())?;
    let result = ForecastResult::new(test.dates().to_vec(), values, test.values())?;

    tracing::info!(
        order = %model.candidate(),
        steps = result.len(),
        mae = result.mean_absolute_error(),
        "evaluated forecast"
    );

    Ok(result)
}

/// Like [`evaluate`], with normal-theory confidence intervals at `level`
pub fn evaluate_with_intervals(
    model: &SarimaModel,
    test: &MonthlySeries,
    level: f64,
) -> Result<ForecastResult> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Confidence level must be between 0 and 1, got {}",
            level
        )));
    }

    let result = evaluate(model, test)?;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
    let z = normal.inverse_cdf((1.0 + level) / 2.0);

    let intervals = result
        .values()
        .iter()
        .zip(model.forecast_variances(result.len())?)
        .map(|(value, variance)| {
            let margin = z * variance.sqrt();
            (value - margin, value + margin)
        })
        .collect();

    result.with_intervals(intervals)
}

/// Mean absolute error between forecast and actual values, position by position
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    if forecast.len() != actual.len() {
        return Err(ForecastError::LengthMismatch {
            forecast: forecast.len(),
            actual: actual.len(),
        });
    }
    if forecast.is_empty() {
        return Err(ForecastError::EmptySeries(
            "Cannot score an empty forecast".to_string(),
        ));
    }

    let sum: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (f - a).abs())
        .sum();

    Ok(sum / forecast.len() as f64)
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    let mae = mean_absolute_error(forecast, actual)?;
    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Months with zero accidents carry no percentage error
    let scored: Vec<f64> = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .collect();
    let mape = if scored.is_empty() {
        None
    } else {
        Some(scored.iter().sum::<f64>() / scored.len() as f64)
    };

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over months with non-zero actuals
    pub mape: Option<f64>,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {:.4}%", mape)?,
            None => writeln!(f, "  MAPE:  n/a")?,
        }
        Ok(())
    }
}
