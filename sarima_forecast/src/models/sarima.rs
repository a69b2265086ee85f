//! Seasonal ARIMA models estimated by conditional sum of squares
//!
//! The model is `φ(B)Φ(B^s)(1-B)^d(1-B^s)^D y_t = θ(B)Θ(B^s) e_t` without a
//! trend term. Differencing is folded into the autoregressive operator so
//! residuals, in-sample predictions and forecasts all work on the level of the
//! undifferenced series.

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::models::order::OrderCandidate;
use crate::utils::{month_start, months_between};
use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use series_math::{is_invertible, is_stationary, LagPolynomial};
use thiserror::Error;

/// Objective value used for inadmissible or divergent parameter vectors
const PENALTY: f64 = 1e100;
/// Residual magnitude treated as a diverging recursion
const DIVERGENCE_LIMIT: f64 = 1e50;
/// Standard-deviation tolerance of the simplex
const SIMPLEX_TOLERANCE: f64 = 1e-10;
/// Edge length of the initial simplex
const SIMPLEX_STEP: f64 = 0.1;
/// Furthest point prediction accepted, in months past the training data
pub const MAX_PREDICTION_HORIZON: usize = 1200;

/// Why a single candidate order could not be fitted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateFitFailure {
    #[error("insufficient data: need more than {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("singular fit: residual variance {variance:e} is not positive")]
    Singular { variance: f64 },

    #[error("conditional sum of squares is not finite")]
    NonFinite,

    #[error("optimizer failed: {0}")]
    Optimizer(String),

    #[error("no admissible parameters under stationarity/invertibility constraints")]
    ConstraintViolation,
}

/// Estimation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Reject non-stationary autoregressive operators
    pub enforce_stationarity: bool,
    /// Reject non-invertible moving-average operators
    pub enforce_invertibility: bool,
    /// Iteration cap of the simplex optimizer
    pub max_iterations: u64,
}

impl FitOptions {
    /// No constraints, so a grid search can explore freely
    pub fn relaxed() -> Self {
        Self {
            enforce_stationarity: false,
            enforce_invertibility: false,
            max_iterations: 2000,
        }
    }

    /// Stationarity and invertibility both enforced
    pub fn enforced() -> Self {
        Self {
            enforce_stationarity: true,
            enforce_invertibility: true,
            ..Self::relaxed()
        }
    }

    /// Override the iteration cap
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::relaxed()
    }
}

/// Estimated coefficients of a seasonal ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaParameters {
    /// Non-seasonal AR coefficients φ
    pub ar: Vec<f64>,
    /// Non-seasonal MA coefficients θ
    pub ma: Vec<f64>,
    /// Seasonal AR coefficients Φ
    pub seasonal_ar: Vec<f64>,
    /// Seasonal MA coefficients Θ
    pub seasonal_ma: Vec<f64>,
}

impl SarimaParameters {
    /// Unpack an optimizer vector laid out as [φ, θ, Φ, Θ]
    fn from_vector(candidate: &OrderCandidate, vector: &[f64]) -> Self {
        let (ar, rest) = vector.split_at(candidate.order.p);
        let (ma, rest) = rest.split_at(candidate.order.q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(candidate.seasonal.p);

        Self {
            ar: ar.to_vec(),
            ma: ma.to_vec(),
            seasonal_ar: seasonal_ar.to_vec(),
            seasonal_ma: seasonal_ma.to_vec(),
        }
    }

    /// Integrated autoregressive operator φ(B)Φ(B^s)(1-B)^d(1-B^s)^D
    fn ar_operator(&self, candidate: &OrderCandidate) -> series_math::Result<LagPolynomial> {
        let period = candidate.seasonal.period;
        let ar = LagPolynomial::autoregressive(&self.ar, 1)?;
        let seasonal_ar = LagPolynomial::autoregressive(&self.seasonal_ar, period)?;
        let diff = LagPolynomial::differencing(candidate.order.d, 1)?;
        let seasonal_diff = LagPolynomial::differencing(candidate.seasonal.d, period)?;

        Ok(&(&ar * &seasonal_ar) * &(&diff * &seasonal_diff))
    }

    /// Moving-average operator θ(B)Θ(B^s)
    fn ma_operator(&self, candidate: &OrderCandidate) -> series_math::Result<LagPolynomial> {
        let ma = LagPolynomial::moving_average(&self.ma, 1)?;
        let seasonal_ma = LagPolynomial::moving_average(&self.seasonal_ma, candidate.seasonal.period)?;

        Ok(&ma * &seasonal_ma)
    }

    /// Check the parameters against the constraints switched on in `options`
    pub fn is_admissible(&self, options: &FitOptions) -> bool {
        let stationary = !options.enforce_stationarity
            || (is_stationary(&self.ar) && is_stationary(&self.seasonal_ar));
        let invertible = !options.enforce_invertibility
            || (is_invertible(&self.ma) && is_invertible(&self.seasonal_ma));

        stationary && invertible
    }
}

/// Residual recursion `e_t = AR(B) y_t - Σ_{j≥1} m_j e_{t-j}`, zero before the first full lag window
fn css_residuals(observations: &[f64], ar: &LagPolynomial, ma: &LagPolynomial) -> Option<Vec<f64>> {
    let n = observations.len();
    let start = ar.degree();
    let mut residuals = vec![0.0; n];

    for t in start..n {
        let mut value: f64 = ar
            .coefficients()
            .iter()
            .enumerate()
            .map(|(i, c)| c * observations[t - i])
            .sum();
        for (j, m) in ma.coefficients().iter().enumerate().skip(1).take(t) {
            value -= m * residuals[t - j];
        }

        if !value.is_finite() || value.abs() > DIVERGENCE_LIMIT {
            return None;
        }
        residuals[t] = value;
    }

    Some(residuals)
}

/// Conditional sum of squares as an argmin cost function
#[derive(Clone)]
struct ConditionalSumOfSquares {
    candidate: OrderCandidate,
    observations: Vec<f64>,
    options: FitOptions,
}

impl ConditionalSumOfSquares {
    fn residuals(&self, params: &SarimaParameters) -> Option<Vec<f64>> {
        let ar = params.ar_operator(&self.candidate).ok()?;
        let ma = params.ma_operator(&self.candidate).ok()?;
        css_residuals(&self.observations, &ar, &ma)
    }

    fn evaluate(&self, vector: &[f64]) -> f64 {
        let params = SarimaParameters::from_vector(&self.candidate, vector);
        if !params.is_admissible(&self.options) {
            return PENALTY;
        }

        let start = self.candidate.conditioning_lags();
        match self.residuals(&params) {
            Some(residuals) => {
                let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
                if css.is_finite() {
                    css.min(PENALTY)
                } else {
                    PENALTY
                }
            }
            None => PENALTY,
        }
    }
}

impl CostFunction for ConditionalSumOfSquares {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        Ok(self.evaluate(param))
    }
}

fn minimise(
    problem: ConditionalSumOfSquares,
    initial: Vec<f64>,
    max_iterations: u64,
) -> std::result::Result<Vec<f64>, CandidateFitFailure> {
    let mut simplex = vec![initial.clone()];
    for i in 0..initial.len() {
        let mut vertex = initial.clone();
        vertex[i] += SIMPLEX_STEP;
        simplex.push(vertex);
    }

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(SIMPLEX_TOLERANCE)
        .map_err(|e| CandidateFitFailure::Optimizer(e.to_string()))?;

    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(max_iterations))
        .run()
        .map_err(|e| CandidateFitFailure::Optimizer(e.to_string()))?;

    result
        .state()
        .get_best_param()
        .cloned()
        .ok_or_else(|| CandidateFitFailure::Optimizer("no best parameters reported".to_string()))
}

/// Fitted seasonal ARIMA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaModel {
    candidate: OrderCandidate,
    parameters: SarimaParameters,
    options: FitOptions,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    start: NaiveDate,
    observations: Vec<f64>,
    residuals: Vec<f64>,
}

impl SarimaModel {
    /// Fit `candidate` to a monthly series
    pub fn fit(
        series: &MonthlySeries,
        candidate: OrderCandidate,
        options: FitOptions,
    ) -> std::result::Result<Self, CandidateFitFailure> {
        if candidate.seasonal.period == 0 {
            return Err(CandidateFitFailure::InvalidOrder(
                "seasonal period must be greater than zero".to_string(),
            ));
        }

        let observations = series.values().to_vec();
        let n = observations.len();
        let conditioning = candidate.conditioning_lags();
        let needed = conditioning + candidate.num_params();
        if n <= needed {
            return Err(CandidateFitFailure::InsufficientData { needed, got: n });
        }
        let start = series
            .first_date()
            .ok_or(CandidateFitFailure::InsufficientData { needed, got: n })?;

        let problem = ConditionalSumOfSquares {
            candidate,
            observations,
            options,
        };

        let initial = vec![0.0; candidate.num_coefficients()];
        let estimate = if initial.is_empty() {
            initial
        } else {
            minimise(problem.clone(), initial, options.max_iterations)?
        };

        let parameters = SarimaParameters::from_vector(&candidate, &estimate);
        if !parameters.is_admissible(&options) {
            return Err(CandidateFitFailure::ConstraintViolation);
        }

        let residuals = problem
            .residuals(&parameters)
            .ok_or(CandidateFitFailure::NonFinite)?;
        let css: f64 = residuals[conditioning..].iter().map(|e| e * e).sum();
        if !css.is_finite() {
            return Err(CandidateFitFailure::NonFinite);
        }

        let n_eff = (n - conditioning) as f64;
        let sigma2 = css / n_eff;
        let scale = problem.observations.iter().map(|y| y.abs()).fold(0.0, f64::max);
        if !(sigma2 > f64::EPSILON * (1.0 + scale * scale)) {
            return Err(CandidateFitFailure::Singular { variance: sigma2 });
        }

        let k = candidate.num_params() as f64;
        let log_likelihood =
            -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();
        if !aic.is_finite() {
            return Err(CandidateFitFailure::NonFinite);
        }

        Ok(Self {
            candidate,
            parameters,
            options,
            sigma2,
            log_likelihood,
            aic,
            bic,
            start,
            observations: problem.observations,
            residuals,
        })
    }

    /// Order the model was fitted with
    pub fn candidate(&self) -> OrderCandidate {
        self.candidate
    }

    /// Estimated coefficients
    pub fn parameters(&self) -> &SarimaParameters {
        &self.parameters
    }

    /// Estimation settings used for the fit
    pub fn options(&self) -> FitOptions {
        self.options
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Gaussian log-likelihood at the estimate
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// First training month
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Number of training observations
    pub fn nobs(&self) -> usize {
        self.observations.len()
    }

    /// Training observations
    pub fn observations(&self) -> &[f64] {
        &self.observations
    }

    /// Residuals (zero during the conditioning window)
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Whether the estimate is stationary and invertible
    pub fn satisfies_constraints(&self) -> bool {
        self.parameters.is_admissible(&FitOptions::enforced())
    }

    /// Check internal consistency after deserialization
    pub fn validate(&self) -> Result<()> {
        if self.observations.is_empty() || self.observations.len() != self.residuals.len() {
            return Err(ForecastError::DataFormat(format!(
                "Stored model has {} observations and {} residuals",
                self.observations.len(),
                self.residuals.len()
            )));
        }

        let c = &self.candidate;
        let p = &self.parameters;
        if p.ar.len() != c.order.p
            || p.ma.len() != c.order.q
            || p.seasonal_ar.len() != c.seasonal.p
            || p.seasonal_ma.len() != c.seasonal.q
        {
            return Err(ForecastError::DataFormat(format!(
                "Stored coefficients do not match order {}",
                c
            )));
        }

        Ok(())
    }

    fn operators(&self) -> Result<(LagPolynomial, LagPolynomial)> {
        Ok((
            self.parameters.ar_operator(&self.candidate)?,
            self.parameters.ma_operator(&self.candidate)?,
        ))
    }

    /// One-step-ahead in-sample predictions on the level of the series
    ///
    /// During the conditioning window the observation itself is returned.
    pub fn fitted_values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .zip(&self.residuals)
            .map(|(y, e)| y - e)
            .collect()
    }

    /// Forecast `horizon` months past the training data
    pub fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let (ar, ma) = self.operators()?;
        let n = self.observations.len();

        let mut levels = self.observations.clone();
        let mut shocks = self.residuals.clone();
        levels.reserve(horizon);
        shocks.reserve(horizon);

        for _ in 0..horizon {
            let t = levels.len();
            let mut value = 0.0;
            for (i, c) in ar.coefficients().iter().enumerate().skip(1).take(t) {
                value -= c * levels[t - i];
            }
            for (j, m) in ma.coefficients().iter().enumerate().skip(1).take(t) {
                value += m * shocks[t - j];
            }
            levels.push(value);
            shocks.push(0.0);
        }

        Ok(levels.split_off(n))
    }

    /// Forecast error variance for each of `horizon` steps
    pub fn forecast_variances(&self, horizon: usize) -> Result<Vec<f64>> {
        let (ar, ma) = self.operators()?;
        let psi = ma.impulse_response(&ar, horizon)?;

        let mut cumulative = 0.0;
        Ok(psi
            .iter()
            .map(|weight| {
                cumulative += weight * weight;
                self.sigma2 * cumulative
            })
            .collect())
    }

    /// Point estimate for the first day of `year`-`month`
    ///
    /// In-sample months return the one-step-ahead prediction, later months the
    /// multi-step forecast.
    pub fn predict_at(&self, year: i32, month: u32) -> Result<f64> {
        let target = month_start(year, month).ok_or_else(|| {
            ForecastError::InvalidDate(format!("{}-{:02} is not a valid calendar month", year, month))
        })?;

        let offset = months_between(self.start, target);
        if offset < 0 {
            return Err(ForecastError::InvalidDate(format!(
                "{} precedes the first training month {}",
                target.format("%Y-%m"),
                self.start.format("%Y-%m")
            )));
        }

        let offset = offset as usize;
        let n = self.observations.len();
        if offset < n {
            return Ok(self.observations[offset] - self.residuals[offset]);
        }

        let horizon = offset - n + 1;
        if horizon > MAX_PREDICTION_HORIZON {
            return Err(ForecastError::InvalidDate(format!(
                "{} lies more than {} months past the training data",
                target.format("%Y-%m"),
                MAX_PREDICTION_HORIZON
            )));
        }

        self.forecast(horizon)?
            .last()
            .copied()
            .ok_or_else(|| ForecastError::ModelFit("empty forecast".to_string()))
    }
}
