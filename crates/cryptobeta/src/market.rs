//! Intervals, symbols and the tradable universe.

use crate::{BetaError, Result};
use derive_more::{Display, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candlestick interval, passed to the market data endpoint unchanged.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Interval {
    /// Five minutes
    #[display("5m")]
    #[serde(rename = "5m")]
    FiveMinutes,
    /// Fifteen minutes
    #[display("15m")]
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// One hour
    #[default]
    #[display("1h")]
    #[serde(rename = "1h")]
    OneHour,
    /// Four hours
    #[display("4h")]
    #[serde(rename = "4h")]
    FourHours,
    /// One day
    #[display("1d")]
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    /// Every recognized interval, shortest first.
    pub const ALL: [Self; 5] = [
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::OneHour,
        Self::FourHours,
        Self::OneDay,
    ];

    /// Wire representation expected by the klines endpoint.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }
}

impl FromStr for Interval {
    type Err = BetaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| BetaError::UnknownInterval(s.to_string()))
    }
}

/// A trading pair such as `ETHUSDT`.
#[derive(Debug, Display, Into, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse a symbol, requiring upper-case ASCII letters and digits.
    pub fn new(symbol: impl Into<String>) -> Result<Self> {
        let symbol = symbol.into();
        let valid = !symbol.is_empty()
            && symbol
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if valid {
            Ok(Self(symbol))
        } else {
            Err(BetaError::InvalidSymbol(symbol))
        }
    }

    /// Symbol as sent to the endpoint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = BetaError;

    fn try_from(symbol: String) -> Result<Self> {
        Self::new(symbol)
    }
}

impl FromStr for Symbol {
    type Err = BetaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Base symbol plus the alts that may be selected against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    base: Symbol,
    alts: Vec<Symbol>,
}

impl Universe {
    /// Default base asset.
    pub const DEFAULT_BASE: &'static str = "BTCUSDT";

    /// Default alt allow-list.
    pub const DEFAULT_ALTS: [&'static str; 4] = ["ETHUSDT", "SOLUSDT", "PEPEUSDT", "WIFUSDT"];

    /// Create a universe. The base may not also be listed as an alt.
    pub fn new(base: Symbol, alts: Vec<Symbol>) -> Result<Self> {
        if alts.contains(&base) {
            return Err(BetaError::Config(format!(
                "base symbol {base} is also listed as an alt"
            )));
        }
        let mut unique: Vec<Symbol> = Vec::with_capacity(alts.len());
        for alt in alts {
            if !unique.contains(&alt) {
                unique.push(alt);
            }
        }
        Ok(Self { base, alts: unique })
    }

    /// The base asset every alt is regressed against.
    pub const fn base(&self) -> &Symbol {
        &self.base
    }

    /// The alt allow-list, in configured order.
    pub fn alts(&self) -> &[Symbol] {
        &self.alts
    }

    /// Resolve a user selection against the allow-list.
    ///
    /// Unknown symbols are rejected and duplicates dropped. The result follows
    /// the allow-list order so repeated selections render identically.
    pub fn select<S: AsRef<str>>(&self, requested: &[S]) -> Result<Vec<Symbol>> {
        for name in requested {
            let name = name.as_ref();
            if !self.alts.iter().any(|alt| alt.as_str() == name) {
                return Err(BetaError::UnknownSymbol(name.to_string()));
            }
        }
        Ok(self
            .alts
            .iter()
            .filter(|alt| requested.iter().any(|r| r.as_ref() == alt.as_str()))
            .cloned()
            .collect())
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            base: Symbol(Self::DEFAULT_BASE.to_string()),
            alts: Self::DEFAULT_ALTS
                .iter()
                .map(|s| Symbol((*s).to_string()))
                .collect(),
        }
    }
}
