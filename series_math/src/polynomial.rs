//! Lag-operator polynomials
//!
//! Contains the polynomial algebra used by seasonal ARIMA models:
//! - Autoregressive and moving-average operators at any lag step
//! - Regular and seasonal differencing operators
//! - Products of operators and impulse-response (psi) weights

use crate::{MathError, Result};
use std::ops::Mul;

/// Polynomial in the backshift operator `B`
///
/// `coefficients[i]` multiplies `B^i`. Every operator built by this module is
/// monic, i.e. `coefficients[0] == 1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct LagPolynomial {
    coefficients: Vec<f64>,
}

impl LagPolynomial {
    /// The identity operator `1`
    pub fn one() -> Self {
        Self {
            coefficients: vec![1.0],
        }
    }

    /// Create a polynomial from raw coefficients, lowest lag first
    pub fn from_coefficients(coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(MathError::InvalidInput(
                "A lag polynomial needs at least one coefficient".to_string(),
            ));
        }

        Ok(Self { coefficients })
    }

    /// Autoregressive operator `1 - φ1·B^s - φ2·B^2s - ...`
    pub fn autoregressive(params: &[f64], lag_step: usize) -> Result<Self> {
        Self::spread(params, lag_step, -1.0)
    }

    /// Moving-average operator `1 + θ1·B^s + θ2·B^2s + ...`
    pub fn moving_average(params: &[f64], lag_step: usize) -> Result<Self> {
        Self::spread(params, lag_step, 1.0)
    }

    /// Differencing operator `(1 - B^s)^order`
    pub fn differencing(order: usize, lag_step: usize) -> Result<Self> {
        let single = Self::spread(&[1.0], lag_step, -1.0)?;

        Ok((0..order).fold(Self::one(), |acc, _| &acc * &single))
    }

    fn spread(params: &[f64], lag_step: usize, sign: f64) -> Result<Self> {
        if lag_step == 0 {
            return Err(MathError::InvalidInput(
                "Lag step must be greater than zero".to_string(),
            ));
        }

        let mut coefficients = vec![0.0; params.len() * lag_step + 1];
        coefficients[0] = 1.0;
        for (i, &param) in params.iter().enumerate() {
            coefficients[(i + 1) * lag_step] = sign * param;
        }

        Ok(Self { coefficients })
    }

    /// Multiply two operators
    pub fn multiply(&self, other: &Self) -> Self {
        let mut coefficients = vec![0.0; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }

        Self { coefficients }
    }

    /// Highest lag carried by the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients, lowest lag first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of `B^lag` (zero beyond the degree)
    pub fn coefficient(&self, lag: usize) -> f64 {
        self.coefficients.get(lag).copied().unwrap_or(0.0)
    }

    /// First `count` psi weights of the rational operator `self / denominator`
    ///
    /// With `self` the MA operator and `denominator` the (integrated) AR
    /// operator these are the weights of the infinite MA representation,
    /// `ψ0 = 1`.
    pub fn impulse_response(&self, denominator: &Self, count: usize) -> Result<Vec<f64>> {
        let lead = denominator.coefficient(0);
        if lead.abs() < f64::EPSILON {
            return Err(MathError::CalculationError(
                "Denominator polynomial has a zero constant term".to_string(),
            ));
        }

        let mut psi: Vec<f64> = Vec::with_capacity(count);
        for k in 0..count {
            let mut value = self.coefficient(k);
            for i in 1..=k.min(denominator.degree()) {
                value -= denominator.coefficients[i] * psi[k - i];
            }
            psi.push(value / lead);
        }

        Ok(psi)
    }
}

impl Mul for &LagPolynomial {
    type Output = LagPolynomial;

    fn mul(self, rhs: &LagPolynomial) -> LagPolynomial {
        self.multiply(rhs)
    }
}
