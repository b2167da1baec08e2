//! Scatter traces and plot frames.
//!
//! Serializes to the trace/layout shape Plotly expects, so a front end can pass
//! `data` and `layout` straight to `Plotly.newPlot`.

use crate::{BetaEstimate, Interval, ReturnSeries, Symbol};
use serde::Serialize;
use std::fmt::Write as _;

/// Per-trace metadata carried in Plotly's free-form `meta` attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceMeta {
    /// Alt symbol
    pub symbol: Symbol,
    /// Beta against the base
    pub beta: f64,
    /// Paired observations behind the estimate
    pub observations: usize,
}

/// One scatter trace: base returns on x, alt returns on y.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    /// Base returns
    pub x: ReturnSeries,
    /// Alt returns
    pub y: ReturnSeries,
    /// Always `markers`
    pub mode: &'static str,
    /// Always `scatter`
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Legend label, `"{symbol} (Beta: x.xx)"`
    pub name: String,
    /// Symbol and estimate
    pub meta: TraceMeta,
}

impl ScatterTrace {
    /// Build a trace for `symbol` from paired returns and their beta.
    pub fn new(symbol: Symbol, x: ReturnSeries, y: ReturnSeries, estimate: BetaEstimate) -> Self {
        Self {
            name: estimate.label(symbol.as_str()),
            x,
            y,
            mode: "markers",
            kind: "scatter",
            meta: TraceMeta {
                symbol,
                beta: estimate.beta,
                observations: estimate.observations,
            },
        }
    }
}

/// An alt left out of the plot because its beta is undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedAsset {
    /// Alt symbol
    pub symbol: Symbol,
    /// Why no beta could be computed
    pub reason: String,
}

/// Axis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    /// Axis title
    pub title: String,
}

/// Plot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotLayout {
    /// Chart title
    pub title: String,
    /// Base returns axis
    pub xaxis: Axis,
    /// Alt returns axis
    pub yaxis: Axis,
    /// Whether the legend (with beta labels) is shown
    pub showlegend: bool,
}

impl PlotLayout {
    /// Layout for alts plotted against `base`.
    pub fn for_base(base: &Symbol) -> Self {
        let asset = base
            .as_str()
            .strip_suffix("USDT")
            .filter(|s| !s.is_empty())
            .unwrap_or(base.as_str());
        Self {
            title: "Crypto Beta Dashboard".to_string(),
            xaxis: Axis {
                title: format!("{asset} Returns"),
            },
            yaxis: Axis {
                title: "Altcoin Returns".to_string(),
            },
            showlegend: true,
        }
    }
}

/// Everything displayed after one completed update cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotFrame {
    /// Cycle that produced this frame
    pub cycle: u64,
    /// Interval the series were fetched at
    pub interval: Interval,
    /// Base asset
    pub base: Symbol,
    /// One trace per alt with a defined beta
    #[serde(rename = "data")]
    pub traces: Vec<ScatterTrace>,
    /// Alts without a defined beta
    pub flagged: Vec<FlaggedAsset>,
    /// Plot layout
    pub layout: PlotLayout,
}

impl PlotFrame {
    /// Beta for `symbol`, if it was plotted.
    pub fn beta(&self, symbol: &str) -> Option<f64> {
        self.traces
            .iter()
            .find(|t| t.meta.symbol.as_str() == symbol)
            .map(|t| t.meta.beta)
    }

    /// Plain-text summary, one line per alt.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Beta vs {} @ {} (cycle {})",
            self.base, self.interval, self.cycle
        );
        let _ = writeln!(out, "{:<12} {:>8} {:>6}", "SYMBOL", "BETA", "N");
        for trace in &self.traces {
            let _ = writeln!(
                out,
                "{:<12} {:>8.2} {:>6}",
                trace.meta.symbol.as_str(),
                trace.meta.beta,
                trace.meta.observations
            );
        }
        for flagged in &self.flagged {
            let _ = writeln!(
                out,
                "{:<12} {:>8} {:>6}  {}",
                flagged.symbol.as_str(),
                "n/a",
                "-",
                flagged.reason
            );
        }
        out
    }
}
