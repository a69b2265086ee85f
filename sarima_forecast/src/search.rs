//! Exhaustive grid search over seasonal ARIMA orders
//!
//! Every candidate of a [`SearchGrid`] is fitted independently, optionally in
//! parallel, and the results are folded in enumeration order: a strictly lower
//! AIC replaces the running best, so ties keep the earlier candidate no matter
//! how the fits were scheduled.

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::{CandidateFitFailure, FitOptions, OrderCandidate, SarimaModel, SearchGrid};
use rayon::prelude::*;
use tracing::{debug, info};

/// Outcome of fitting one candidate
pub type FitResult = std::result::Result<SarimaModel, CandidateFitFailure>;

/// Fits a single candidate order to a training series
pub trait CandidateFitter: Sync {
    /// Fit `candidate` to `train`
    fn fit(&self, train: &MonthlySeries, candidate: OrderCandidate) -> FitResult;
}

/// Fitter backed by [`SarimaModel::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaFitter {
    options: FitOptions,
}

impl SarimaFitter {
    /// Create a fitter with the given estimation settings
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// Estimation settings
    pub fn options(&self) -> FitOptions {
        self.options
    }
}

impl Default for SarimaFitter {
    fn default() -> Self {
        Self::new(FitOptions::relaxed())
    }
}

impl CandidateFitter for SarimaFitter {
    fn fit(&self, train: &MonthlySeries, candidate: OrderCandidate) -> FitResult {
        SarimaModel::fit(train, candidate, self.options)
    }
}

/// Lowest-AIC model of a search
#[derive(Debug, Clone, PartialEq)]
pub struct BestModel {
    /// Winning order
    pub candidate: OrderCandidate,
    /// Model fitted with that order
    pub model: SarimaModel,
    /// Its AIC
    pub aic: f64,
}

/// Everything a search produced
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// The winner
    pub best: BestModel,
    /// AIC of every successful candidate, in enumeration order
    pub scores: Vec<(OrderCandidate, f64)>,
    /// Every skipped candidate with the reason, in enumeration order
    pub failures: Vec<(OrderCandidate, CandidateFitFailure)>,
}

impl SearchOutcome {
    /// Number of candidates evaluated
    pub fn evaluated(&self) -> usize {
        self.scores.len() + self.failures.len()
    }
}

/// Grid search configuration
#[derive(Debug, Clone)]
pub struct OrderSearch<F = SarimaFitter> {
    grid: SearchGrid,
    fitter: F,
    parallel: bool,
}

impl OrderSearch<SarimaFitter> {
    /// Search `grid` with stationarity and invertibility enforcement disabled
    pub fn new(grid: SearchGrid) -> Self {
        Self::with_fitter(grid, SarimaFitter::default())
    }
}

impl<F: CandidateFitter> OrderSearch<F> {
    /// Search `grid` with a custom fitter
    pub fn with_fitter(grid: SearchGrid, fitter: F) -> Self {
        Self {
            grid,
            fitter,
            parallel: true,
        }
    }

    /// Fit candidates on the rayon pool (default) or one after another
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Grid being searched
    pub fn grid(&self) -> &SearchGrid {
        &self.grid
    }

    /// Fit every candidate to `train` and keep the lowest AIC
    pub fn run(&self, train: &MonthlySeries) -> Result<SearchOutcome> {
        let candidates = self.grid.candidates();
        info!(
            candidates = candidates.len(),
            observations = train.len(),
            parallel = self.parallel,
            "starting order search"
        );

        let results: Vec<(OrderCandidate, FitResult)> = if self.parallel {
            candidates
                .par_iter()
                .map(|candidate| (*candidate, self.evaluate(train, *candidate)))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| (*candidate, self.evaluate(train, *candidate)))
                .collect()
        };

        let outcome = select_best(results)?;
        info!(
            order = %outcome.best.candidate,
            aic = outcome.best.aic,
            evaluated = outcome.evaluated(),
            failed = outcome.failures.len(),
            "order search finished"
        );

        Ok(outcome)
    }

    fn evaluate(&self, train: &MonthlySeries, candidate: OrderCandidate) -> FitResult {
        let result = self.fitter.fit(train, candidate);
        match &result {
            Ok(model) => debug!(order = %candidate, aic = model.aic(), "candidate fitted"),
            Err(reason) => debug!(order = %candidate, %reason, "candidate skipped"),
        }
        result
    }
}

/// Fold fit results, in the order given, to the lowest AIC
///
/// Only a strictly lower AIC replaces the running best. Fails with
/// [`ForecastError::NoFeasibleModel`] when nothing was fitted.
pub fn select_best<I>(results: I) -> Result<SearchOutcome>
where
    I: IntoIterator<Item = (OrderCandidate, FitResult)>,
{
    let mut best: Option<BestModel> = None;
    let mut scores = Vec::new();
    let mut failures = Vec::new();

    for (candidate, result) in results {
        match result {
            Ok(model) => {
                let aic = model.aic();
                scores.push((candidate, aic));
                if best.as_ref().map_or(true, |current| aic < current.aic) {
                    best = Some(BestModel {
                        candidate,
                        model,
                        aic,
                    });
                }
            }
            Err(reason) => failures.push((candidate, reason)),
        }
    }

    match best {
        Some(best) => Ok(SearchOutcome {
            best,
            scores,
            failures,
        }),
        None => Err(ForecastError::NoFeasibleModel {
            evaluated: failures.len(),
        }),
    }
}
