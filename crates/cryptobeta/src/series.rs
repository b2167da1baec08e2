//! Immutable price and return series.
//!
//! Position implies chronological order, earliest first. Neither type exposes
//! mutable access once constructed.

use crate::{BetaError, Result};
use serde::Serialize;
use std::ops::Deref;

/// Ordered closing prices, earliest first.
///
/// Every price is finite and non-negative. Zero is accepted here and shows up
/// as a non-finite value in the derived [`ReturnSeries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    /// Build a price series, rejecting negative, NaN or infinite prices.
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if let Some((index, &value)) = prices
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(BetaError::InvalidPrice { index, value });
        }
        Ok(Self(prices))
    }

    /// Underlying prices.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume the series and return the prices.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for PriceSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = BetaError;

    fn try_from(prices: Vec<f64>) -> Result<Self> {
        Self::new(prices)
    }
}

/// Simple period-over-period returns derived from a [`PriceSeries`].
///
/// Always exactly one element shorter than its source, or empty when the source
/// has fewer than two prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    pub(crate) const fn from_raw(returns: Vec<f64>) -> Self {
        Self(returns)
    }

    /// Underlying returns.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume the series and return the values.
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Index of the first NaN or infinite return, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|r| !r.is_finite())
    }

    /// Whether every return is finite.
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Return the series unchanged if every value is finite.
    pub fn ensure_finite(self) -> Result<Self> {
        match self.first_non_finite() {
            Some(index) => Err(BetaError::NonFiniteReturn { index }),
            None => Ok(self),
        }
    }
}

impl Deref for ReturnSeries {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![])]
    #[case(vec![0.0])]
    #[case(vec![100.0, 110.0, 99.0])]
    fn test_price_series_accepts_non_negative(#[case] prices: Vec<f64>) {
        let series = PriceSeries::new(prices.clone()).unwrap();
        assert_eq!(series.as_slice(), prices.as_slice());
    }

    #[rstest]
    #[case(vec![1.0, -2.0], 1)]
    #[case(vec![f64::NAN], 0)]
    #[case(vec![1.0, 2.0, f64::INFINITY], 2)]
    fn test_price_series_rejects_invalid(#[case] prices: Vec<f64>, #[case] expected: usize) {
        match PriceSeries::new(prices) {
            Err(BetaError::InvalidPrice { index, .. }) => assert_eq!(index, expected),
            other => panic!("expected InvalidPrice, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_zero_is_a_price() {
        assert!(PriceSeries::new(vec![-0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_return_series_non_finite_detection() {
        let returns = ReturnSeries::from_raw(vec![0.1, f64::INFINITY, f64::NAN]);
        assert_eq!(returns.first_non_finite(), Some(1));
        assert!(!returns.is_finite());
        assert!(matches!(
            returns.ensure_finite(),
            Err(BetaError::NonFiniteReturn { index: 1 })
        ));
    }

    #[test]
    fn test_series_serialize_as_arrays() {
        let prices = PriceSeries::new(vec![1.0, 2.5]).unwrap();
        assert_eq!(serde_json::to_string(&prices).unwrap(), "[1.0,2.5]");
    }
}
