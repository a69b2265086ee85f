//! # Accident Forecast
//!
//! Umbrella crate for the workspace: lag-operator algebra in `series_math`
//! and the seasonal ARIMA pipeline in `sarima_forecast`. The HTTP service
//! lives in the `forecast_service` binary.
//!
//! ## Example
//!
//! ```
//! use accident_forecast_workspace::forecast::models::SearchGrid;
//!
//! let grid = SearchGrid::default();
//! assert_eq!(grid.len(), 729);
//! assert_eq!(grid.period(), 12);
//! ```

pub use sarima_forecast as forecast;
pub use series_math as math;

pub use sarima_forecast::{ForecastConfig, ForecastError, OrderSearch, SarimaModel};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_candidates() {
        let candidates = forecast::models::SearchGrid::default().candidates();

        assert_eq!(candidates.len(), 729);
        assert_eq!(candidates[0].to_string(), "SARIMA(0,0,0)x(0,0,0,12)");
        assert_eq!(candidates[728].to_string(), "SARIMA(2,2,2)x(2,2,2,12)");
    }

    #[test]
    fn test_math_reexport() {
        let seasonal_difference = math::LagPolynomial::differencing(1, 12).unwrap();
        assert_eq!(seasonal_difference.degree(), 12);
    }
}
