#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cryptobeta/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod beta;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod market;
pub mod plot;
pub mod returns;
pub mod series;
pub mod source;

// Re-export core types
pub use beta::{BetaEstimate, beta, estimate};
pub use config::DashboardConfig;
pub use dashboard::{CycleId, Dashboard, UpdateOutcome, UpdateRequest};
pub use error::{BetaError, Result};
pub use market::{Interval, Symbol, Universe};
pub use plot::{FlaggedAsset, PlotFrame, PlotLayout, ScatterTrace};
pub use returns::{checked_returns, simple_returns};
pub use series::{PriceSeries, ReturnSeries};
pub use source::{BinanceClient, Candle, CandleSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
