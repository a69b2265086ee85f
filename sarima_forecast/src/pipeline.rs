//! End-to-end operations: retrain, evaluate the stored model, fit a fixed order

use crate::config::ForecastConfig;
use crate::data::{prepare, DataLoader, MonthlySeries, PreparedSeries};
use crate::error::{ForecastError, Result};
use crate::metrics::evaluate;
use crate::models::{FitOptions, ForecastResult, OrderCandidate, SarimaModel};
use crate::registry::ModelRegistry;
use crate::search::{OrderSearch, SarimaFitter};
use serde::Serialize;
use tracing::{info, warn};

/// Summary of a successful retrain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrainReport {
    /// Winning order
    pub order: OrderCandidate,
    /// AIC of the stored model
    pub aic: f64,
    /// Candidates tried
    pub evaluated: usize,
    /// Candidates that could not be fitted
    pub failed: usize,
    /// Training months
    pub observations: usize,
    /// Whether the stored model was refitted with constraints enforced
    pub constrained: bool,
}

/// Load the configured CSV and split it at the configured cutoff
pub fn load_prepared(config: &ForecastConfig) -> Result<PreparedSeries> {
    let records = DataLoader::from_csv(&config.dataset_path)?;
    prepare(&records, &config.filter_criteria(), config.cutoff)
}

/// Search the configured grid on the training split and store the winner
pub fn retrain(config: &ForecastConfig, registry: &dyn ModelRegistry) -> Result<RetrainReport> {
    let prepared = load_prepared(config)?;
    retrain_series(config, &prepared.train, registry)
}

/// [`retrain`] on an already prepared training series
///
/// Nothing is saved unless a model was selected.
pub fn retrain_series(
    config: &ForecastConfig,
    train: &MonthlySeries,
    registry: &dyn ModelRegistry,
) -> Result<RetrainReport> {
    let search = OrderSearch::with_fitter(
        config.search_grid()?,
        SarimaFitter::new(config.search_options()),
    )
    .parallel(config.parallel);
    let outcome = search.run(train)?;

    let mut model = outcome.best.model;
    let mut constrained = false;
    if config.enforce_final_constraints && !model.satisfies_constraints() {
        warn!(order = %outcome.best.candidate, "winner violates constraints, refitting");
        let options = FitOptions::enforced().with_max_iterations(config.max_iterations);
        model = SarimaModel::fit(train, outcome.best.candidate, options)
            .map_err(|e| ForecastError::ModelFit(format!("{}: {}", outcome.best.candidate, e)))?;
        constrained = true;
    }

    registry.save(&model)?;

    let report = RetrainReport {
        order: model.candidate(),
        aic: model.aic(),
        evaluated: outcome.scores.len() + outcome.failures.len(),
        failed: outcome.failures.len(),
        observations: train.len(),
        constrained,
    };
    info!(order = %report.order, aic = report.aic, "retrain complete");
    Ok(report)
}

/// Fit one known order to the training split and store it
pub fn fit_fixed(
    config: &ForecastConfig,
    candidate: OrderCandidate,
    registry: &dyn ModelRegistry,
) -> Result<SarimaModel> {
    let prepared = load_prepared(config)?;
    fit_fixed_series(config, candidate, &prepared.train, registry)
}

/// [`fit_fixed`] on an already prepared training series
pub fn fit_fixed_series(
    config: &ForecastConfig,
    candidate: OrderCandidate,
    train: &MonthlySeries,
    registry: &dyn ModelRegistry,
) -> Result<SarimaModel> {
    let options = if config.enforce_final_constraints {
        FitOptions::enforced()
    } else {
        FitOptions::relaxed()
    }
    .with_max_iterations(config.max_iterations);

    let model = SarimaModel::fit(train, candidate, options)
        .map_err(|e| ForecastError::ModelFit(format!("{}: {}", candidate, e)))?;
    registry.save(&model)?;

    info!(order = %candidate, aic = model.aic(), "fixed order fitted");
    Ok(model)
}

/// Score the stored model on the test split
pub fn evaluate_persisted(
    config: &ForecastConfig,
    registry: &dyn ModelRegistry,
) -> Result<(PreparedSeries, ForecastResult)> {
    let prepared = load_prepared(config)?;
    let model = registry.load()?;
    let result = evaluate(&model, &prepared.test)?;
    Ok((prepared, result))
}

/// Point prediction from the stored model
pub fn predict(registry: &dyn ModelRegistry, year: i32, month: u32) -> Result<f64> {
    registry.load()?.predict_at(year, month)
}

/// [`predict`] truncated toward zero to a whole count
pub fn predict_count(registry: &dyn ModelRegistry, year: i32, month: u32) -> Result<i64> {
    truncate_count(predict(registry, year, month)?)
}

/// Truncate toward zero, rejecting values with no `i64` counterpart
pub fn truncate_count(value: f64) -> Result<i64> {
    // 2^63 is exact in f64; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= -LIMIT && truncated < LIMIT {
        Ok(truncated as i64)
    } else {
        Err(ForecastError::ModelFit(format!(
            "prediction {} is not a representable count",
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_count() {
        assert_eq!(truncate_count(12.9).unwrap(), 12);
        assert_eq!(truncate_count(-3.7).unwrap(), -3);
        assert_eq!(truncate_count(0.0).unwrap(), 0);

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e19, -1e19] {
            assert!(matches!(
                truncate_count(value),
                Err(ForecastError::ModelFit(_))
            ));
        }
    }
}
