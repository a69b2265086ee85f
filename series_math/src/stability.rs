//! Stationarity and invertibility checks
//!
//! Uses the Schur-Cohn step-down recursion: the operator `1 - Σ a_i·z^i` has
//! all of its roots outside the unit circle exactly when every reflection
//! coefficient produced by the recursion has modulus below one.

/// Check whether `1 - a1·z - a2·z^2 - ...` has all roots outside the unit circle
pub fn is_stable(params: &[f64]) -> bool {
    if params.iter().any(|a| !a.is_finite()) {
        return false;
    }

    let mut current = params.to_vec();
    while let Some(&kappa) = current.last() {
        if kappa.abs() >= 1.0 {
            return false;
        }

        let k = current.len();
        let scale = 1.0 - kappa * kappa;
        current = (0..k - 1)
            .map(|i| (current[i] + kappa * current[k - 2 - i]) / scale)
            .collect();
    }

    true
}

/// An autoregressive operator `1 - φ1·B - ...` is stationary when it is stable
pub fn is_stationary(ar: &[f64]) -> bool {
    is_stable(ar)
}

/// A moving-average operator `1 + θ1·B + ...` is invertible when `1 - (-θ1)·B - ...` is stable
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|theta| -theta).collect();
    is_stable(&negated)
}
