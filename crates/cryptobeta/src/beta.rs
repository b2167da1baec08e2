//! Market beta - sensitivity of an asset's returns to the base asset's returns.
//!
//! Beta is the ordinary-least-squares slope of the alt returns regressed on the
//! base returns:
//! `β = Σ (x_i - x̄)(y_i - ȳ) / Σ (x_i - x̄)²`
//!
//! Beta = 1 means the asset moves in line with the base. Beta > 1 indicates
//! amplified moves, beta < 1 dampened ones.

use crate::{BetaError, Result};
use serde::Serialize;

/// Outcome of a beta regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BetaEstimate {
    /// Regression slope of alt returns on base returns.
    pub beta: f64,
    /// Number of paired observations used.
    pub observations: usize,
}

impl BetaEstimate {
    /// Legend label for a scatter trace, beta rounded to two decimals.
    pub fn label(&self, symbol: &str) -> String {
        format!("{symbol} (Beta: {:.2})", self.beta)
    }
}

/// Estimate the beta of `alt` returns against `base` returns.
///
/// # Errors
///
/// - [`BetaError::LengthMismatch`] if the series differ in length
/// - [`BetaError::InsufficientData`] if the series are empty
/// - [`BetaError::NonFiniteReturn`] if either series holds NaN or infinity
/// - [`BetaError::ZeroVariance`] if every base return is identical
pub fn estimate(base: &[f64], alt: &[f64]) -> Result<BetaEstimate> {
    if base.len() != alt.len() {
        return Err(BetaError::LengthMismatch {
            base: base.len(),
            alt: alt.len(),
        });
    }
    if base.is_empty() {
        return Err(BetaError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    if let Some(index) = base
        .iter()
        .zip(alt)
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(BetaError::NonFiniteReturn { index });
    }
    // Rounding in the mean can leave a tiny variance for a constant series.
    if base.iter().all(|x| *x == base[0]) {
        return Err(BetaError::ZeroVariance {
            observations: base.len(),
        });
    }

    let n = base.len() as f64;
    let base_mean = base.iter().sum::<f64>() / n;
    let alt_mean = alt.iter().sum::<f64>() / n;

    let (covariance, variance) = base
        .iter()
        .zip(alt)
        .fold((0.0, 0.0), |(cov, var), (x, y)| {
            let dx = x - base_mean;
            (cov + dx * (y - alt_mean), var + dx * dx)
        });

    if variance == 0.0 {
        return Err(BetaError::ZeroVariance {
            observations: base.len(),
        });
    }

    Ok(BetaEstimate {
        beta: covariance / variance,
        observations: base.len(),
    })
}

/// Beta of `alt` returns against `base` returns.
///
/// Shorthand for [`estimate`] when only the slope is needed.
pub fn beta(base: &[f64], alt: &[f64]) -> Result<f64> {
    estimate(base, alt).map(|e| e.beta)
}
