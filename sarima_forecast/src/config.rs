//! Pipeline configuration
//!
//! Defaults target the Munich accident table: the `Alkoholunfälle`/`insgesamt`
//! series, a 2020-01-01 cutoff and a full 0..=2 grid with a yearly season. A JSON file and `FORECAST_*` environment
//! variables can override any field.

use crate::data::FilterCriteria;
use crate::error::{ForecastError, Result};
use crate::models::{FitOptions, SearchGrid};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Settings shared by retraining, evaluation and the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Source CSV table
    pub dataset_path: PathBuf,
    /// Where the current model is stored
    pub model_path: PathBuf,
    /// Category to forecast
    pub category: String,
    /// Aggregate reason value
    pub reason: String,
    /// First month of the test partition
    pub cutoff: NaiveDate,
    /// Largest p, d and q in the grid
    pub max_order: usize,
    /// Largest P, D and Q in the grid
    pub max_seasonal_order: usize,
    /// Seasonal period in months
    pub seasonal_period: usize,
    /// Fit grid candidates in parallel
    pub parallel: bool,
    /// Refit the winning order with stationarity and invertibility enforced
    pub enforce_final_constraints: bool,
    /// Iteration cap of the optimizer for each fit
    pub max_iterations: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/monatszahlen2412_verkehrsunfaelle_06_12_24.csv"),
            model_path: PathBuf::from("models/sarima_model.json"),
            category: "Alkoholunfälle".to_string(),
            reason: "insgesamt".to_string(),
            cutoff: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            max_order: 2,
            max_seasonal_order: 2,
            seasonal_period: 12,
            parallel: true,
            enforce_final_constraints: false,
            max_iterations: FitOptions::relaxed().max_iterations,
        }
    }
}

impl ForecastConfig {
    /// Defaults, then the optional JSON file, then environment variables
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let base = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Read a JSON configuration file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ForecastError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;

        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ForecastError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Apply `FORECAST_*` environment variables on top of `self`
    pub fn with_env_overrides(self) -> Result<Self> {
        Ok(Self {
            dataset_path: env_or("FORECAST_DATASET", self.dataset_path)?,
            model_path: env_or("FORECAST_MODEL_PATH", self.model_path)?,
            category: env_or("FORECAST_CATEGORY", self.category)?,
            reason: env_or("FORECAST_REASON", self.reason)?,
            cutoff: env_or("FORECAST_CUTOFF", self.cutoff)?,
            max_order: env_or("FORECAST_MAX_ORDER", self.max_order)?,
            max_seasonal_order: env_or("FORECAST_MAX_SEASONAL_ORDER", self.max_seasonal_order)?,
            seasonal_period: env_or("FORECAST_PERIOD", self.seasonal_period)?,
            parallel: env_or("FORECAST_PARALLEL", self.parallel)?,
            enforce_final_constraints: env_or(
                "FORECAST_ENFORCE_FINAL",
                self.enforce_final_constraints,
            )?,
            max_iterations: env_or("FORECAST_MAX_ITERS", self.max_iterations)?,
        })
    }

    /// Row selection for the preparer
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.category.clone(), self.reason.clone())
    }

    /// Grid for the order search
    pub fn search_grid(&self) -> Result<SearchGrid> {
        SearchGrid::up_to(self.max_order, self.max_seasonal_order, self.seasonal_period)
    }

    /// Estimation settings used during the search
    pub fn search_options(&self) -> FitOptions {
        FitOptions::relaxed().with_max_iterations(self.max_iterations)
    }
}

fn env_or<T>(key: &str, current: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| ForecastError::Config(format!("{}={:?}: {}", key, raw, e))),
        _ => Ok(current),
    }
}
