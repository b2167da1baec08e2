//! Dashboard configuration.

use crate::{
    BetaError, Interval, Result, Symbol, Universe,
    source::binance::{DEFAULT_BASE_URL, MAX_LIMIT},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the beta dashboard.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Market data host (default: Binance public data API).
    pub base_url: String,
    /// Asset every alt is regressed against (default: BTCUSDT).
    pub base_symbol: Symbol,
    /// Alts that may be selected.
    pub symbols: Vec<Symbol>,
    /// Interval used when none is requested (default: 1h).
    pub interval: Interval,
    /// Candles per fetch, 1..=1000; `None` uses the endpoint default of 500.
    pub limit: Option<u16>,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let universe = Universe::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_symbol: universe.base().clone(),
            symbols: universe.alts().to_vec(),
            interval: Interval::default(),
            limit: None,
            timeout_secs: 10,
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and that the universe is consistent.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(BetaError::Config("base_url must not be empty".to_string()));
        }
        if let Some(limit) = self.limit
            && !(1..=MAX_LIMIT).contains(&limit)
        {
            return Err(BetaError::Config(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(BetaError::Config("timeout_secs must be positive".to_string()));
        }
        self.universe().map(|_| ())
    }

    /// Base symbol and alt allow-list as a [`Universe`].
    pub fn universe(&self) -> Result<Universe> {
        Universe::new(self.base_symbol.clone(), self.symbols.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_config_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, "https://data-api.binance.vision");
        assert_eq!(config.base_symbol.as_str(), "BTCUSDT");
        assert_eq!(config.symbols.len(), 4);
        assert_eq!(config.interval, Interval::OneHour);
        assert_eq!(config.limit, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"interval": "4h", "limit": 200}"#).unwrap();
        assert_eq!(config.interval, Interval::FourHours);
        assert_eq!(config.limit, Some(200));
        assert_eq!(config.base_symbol.as_str(), "BTCUSDT");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<DashboardConfig>(r#"{"intervall": "4h"}"#).is_err());
    }

    #[rstest]
    #[case(Some(0))]
    #[case(Some(1001))]
    fn test_limit_out_of_range(#[case] limit: Option<u16>) {
        let config = DashboardConfig {
            limit,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BetaError::Config(_))));
    }

    #[test]
    fn test_base_in_alts_rejected() {
        let mut config = DashboardConfig::default();
        config.symbols.push(config.base_symbol.clone());
        assert!(matches!(config.validate(), Err(BetaError::Config(_))));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir()
            .join(format!("cryptobeta-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"symbols": ["ETHUSDT"], "timeout_secs": 3}"#).unwrap();
        let config = DashboardConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.symbols, vec![Symbol::new("ETHUSDT").unwrap()]);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_from_missing_path() {
        assert!(matches!(
            DashboardConfig::from_path("/nonexistent/cryptobeta.json"),
            Err(BetaError::Io(_))
        ));
    }
}
