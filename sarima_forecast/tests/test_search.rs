mod common;

use common::{candidate, month, seasonal_series};
use pretty_assertions::assert_eq;
use sarima_forecast::data::MonthlySeries;
use sarima_forecast::models::{CandidateFitFailure, FitOptions, OrderCandidate, SarimaModel, SearchGrid};
use sarima_forecast::search::{select_best, CandidateFitter, FitResult, OrderSearch};
use sarima_forecast::ForecastError;

/// Only the listed candidates fit; everything else is reported as singular
struct ScriptedFitter {
    feasible: Vec<OrderCandidate>,
}

impl CandidateFitter for ScriptedFitter {
    fn fit(&self, train: &MonthlySeries, candidate: OrderCandidate) -> FitResult {
        if self.feasible.contains(&candidate) {
            SarimaModel::fit(train, candidate, FitOptions::relaxed())
        } else {
            Err(CandidateFitFailure::Singular { variance: 0.0 })
        }
    }
}

fn small_grid() -> SearchGrid {
    SearchGrid::up_to(1, 1, 12).unwrap()
}

#[test]
fn test_only_feasible_candidate_wins() {
    let train = seasonal_series(month(2015, 1), 60, 21);
    let winner = candidate((0, 1, 0), (0, 0, 0));
    let fitter = ScriptedFitter { feasible: vec![winner] };

    let outcome = OrderSearch::with_fitter(small_grid(), fitter).run(&train).unwrap();

    assert_eq!(outcome.best.candidate, winner);
    assert_eq!(outcome.scores.len(), 1);
    assert_eq!(outcome.failures.len(), 63);
    assert_eq!(outcome.evaluated(), 64);
    assert!(outcome
        .failures
        .iter()
        .all(|(c, reason)| *c != winner && matches!(reason, CandidateFitFailure::Singular { .. })));
}

#[test]
fn test_failures_keep_enumeration_order() {
    let train = seasonal_series(month(2015, 1), 60, 22);
    let winner = candidate((0, 1, 0), (0, 0, 0));
    let fitter = ScriptedFitter { feasible: vec![winner] };

    let outcome = OrderSearch::with_fitter(small_grid(), fitter).run(&train).unwrap();
    let failed: Vec<OrderCandidate> = outcome.failures.iter().map(|(c, _)| *c).collect();
    let expected: Vec<OrderCandidate> = small_grid()
        .candidates()
        .into_iter()
        .filter(|c| *c != winner)
        .collect();

    assert_eq!(failed, expected);
}

#[test]
fn test_all_candidates_fail() {
    let train = MonthlySeries::from_start(month(2015, 1), vec![0.0; 60]).unwrap();

    let result = OrderSearch::new(small_grid()).run(&train);
    assert!(matches!(
        result,
        Err(ForecastError::NoFeasibleModel { evaluated: 64 })
    ));
}

#[test]
fn test_best_aic_is_global_minimum() {
    let train = seasonal_series(month(2014, 1), 72, 24);
    let outcome = OrderSearch::new(small_grid()).run(&train).unwrap();

    assert_eq!(outcome.evaluated(), 64);
    assert!(outcome.scores.iter().all(|(_, aic)| outcome.best.aic <= *aic));
    assert_eq!(outcome.best.aic, outcome.best.model.aic());
    assert_eq!(outcome.best.candidate, outcome.best.model.candidate());
}

#[test]
fn test_parallel_and_sequential_agree() {
    let train = seasonal_series(month(2014, 1), 72, 25);
    let grid = SearchGrid::up_to(1, 1, 12).unwrap();

    let parallel = OrderSearch::new(grid.clone()).parallel(true).run(&train).unwrap();
    let sequential = OrderSearch::new(grid.clone()).parallel(false).run(&train).unwrap();
    let again = OrderSearch::new(grid).run(&train).unwrap();

    assert_eq!(parallel.best.candidate, sequential.best.candidate);
    assert_eq!(parallel.scores, sequential.scores);
    assert_eq!(parallel.best.model, again.best.model);
}

#[test]
fn test_ties_keep_first_candidate() {
    let train = seasonal_series(month(2015, 1), 60, 26);
    let first = candidate((0, 1, 0), (0, 0, 0));
    let model = SarimaModel::fit(&train, first, FitOptions::relaxed()).unwrap();
    let later = candidate((1, 1, 0), (0, 0, 0));

    let results = vec![
        (first, Ok(model.clone())),
        (later, Ok(model.clone())),
        (candidate((0, 0, 0), (0, 0, 0)), Err(CandidateFitFailure::NonFinite)),
    ];
    let outcome = select_best(results).unwrap();

    assert_eq!(outcome.best.candidate, first);
    assert_eq!(outcome.scores.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
}

#[test]
fn test_select_best_empty() {
    let result = select_best(Vec::<(OrderCandidate, FitResult)>::new());
    assert!(matches!(
        result,
        Err(ForecastError::NoFeasibleModel { evaluated: 0 })
    ));
}
