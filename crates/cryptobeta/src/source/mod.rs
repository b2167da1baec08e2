//! Candlestick sources.
//!
//! A [`CandleSource`] turns a symbol and interval into an ordered
//! [`PriceSeries`] of closing prices. The dashboard only depends on this trait,
//! so tests can swap the HTTP client for an in-memory source.

pub mod binance;

pub use binance::{BinanceClient, parse_klines};

use crate::{Interval, PriceSeries, Result, Symbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A fixed-interval price summary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the interval
    pub open_time: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded base-asset volume
    pub volume: f64,
}

/// Closing prices of `candles`, earliest first.
pub fn close_prices(candles: &[Candle]) -> Result<PriceSeries> {
    PriceSeries::new(candles.iter().map(|c| c.close).collect())
}

/// Market data provider for closing-price series.
pub trait CandleSource: Send + Sync {
    /// Fetch closing prices for `symbol` at `interval`, earliest first.
    ///
    /// Transport errors, non-2xx answers and unparseable records are all
    /// reported as errors; implementations never return a partial series.
    fn fetch_closes(
        &self,
        symbol: &Symbol,
        interval: Interval,
    ) -> impl Future<Output = Result<PriceSeries>> + Send;
}
