//! Simple returns from closing prices.
//!
//! `r_i = (P_{i+1} - P_i) / P_i`
//!
//! A zero price produces `±inf` or `NaN` at the matching position. The raw
//! calculation keeps it so callers can see where it happened; use
//! [`checked_returns`] or [`ReturnSeries::ensure_finite`] before plotting.

use crate::{PriceSeries, Result, ReturnSeries};

/// Period-over-period simple returns.
///
/// The result has `max(N - 1, 0)` elements for `N` prices.
pub fn simple_returns(prices: &PriceSeries) -> ReturnSeries {
    let returns = prices
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    ReturnSeries::from_raw(returns)
}

/// Simple returns, failing with [`crate::BetaError::NonFiniteReturn`] on a zero price.
pub fn checked_returns(prices: &PriceSeries) -> Result<ReturnSeries> {
    simple_returns(prices).ensure_finite()
}
