//! # SARIMA Forecast
//!
//! Seasonal ARIMA forecasting for monthly count series, built around the
//! Munich traffic accident table.
//!
//! ## Features
//!
//! - CSV loading and preparation into a gap-free monthly series
//! - Exhaustive order search by AIC, fitted in parallel
//! - Forecast evaluation by mean absolute error
//! - Point predictions for any calendar month
//! - A single-slot model registry on disk
//!
//! ## Quick Start
//!
//! ```no_run
//! use sarima_forecast::config::ForecastConfig;
//! use sarima_forecast::pipeline;
//! use sarima_forecast::registry::FileModelRegistry;
//!
//! let config = ForecastConfig::default();
//! let registry = FileModelRegistry::new(&config.model_path);
//!
//! let report = pipeline::retrain(&config, &registry)?;
//! println!("best order {} with AIC {:.2}", report.order, report.aic);
//!
//! let prediction = pipeline::predict(&registry, 2021, 1)?;
//! println!("January 2021: {:.0}", prediction);
//! # Ok::<(), sarima_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, FilterCriteria, MonthlySeries, PreparedSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastResult, OrderCandidate, SarimaModel, SearchGrid};
pub use crate::registry::{FileModelRegistry, ModelRegistry};
pub use crate::search::{OrderSearch, SearchOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
