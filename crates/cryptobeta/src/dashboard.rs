//! Update cycles: fetch, compute, commit.
//!
//! Each change of interval or selection starts a new cycle with a higher
//! [`CycleId`]. A cycle fetches the base series once and every selected alt
//! concurrently, computes returns and betas, then commits its frame only if no
//! newer cycle has been started in the meantime. A failed cycle leaves the
//! previously committed frame on display.

use crate::{
    BetaEstimate, CandleSource, FlaggedAsset, Interval, PlotFrame, PlotLayout, PriceSeries,
    Result, ReturnSeries, ScatterTrace, Universe, checked_returns, estimate,
};
use derive_more::Display;
use futures::future::try_join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

/// Monotonically increasing update cycle number.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleId(u64);

impl CycleId {
    /// Raw sequence number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What the user selected: an interval and zero or more alts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Candlestick interval
    pub interval: Interval,
    /// Selected alt symbols
    pub symbols: Vec<String>,
}

impl UpdateRequest {
    /// Request for `symbols` at `interval`.
    pub fn new<S: Into<String>>(
        interval: Interval,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            interval,
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a completed cycle.
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The frame is now on display.
    Applied(Arc<PlotFrame>),
    /// A newer cycle was started before this one finished; its frame was dropped.
    Superseded {
        /// The cycle that finished
        cycle: CycleId,
        /// The newest cycle started
        latest: CycleId,
    },
}

impl UpdateOutcome {
    /// The committed frame, if this cycle was applied.
    pub fn frame(&self) -> Option<&Arc<PlotFrame>> {
        match self {
            Self::Applied(frame) => Some(frame),
            Self::Superseded { .. } => None,
        }
    }
}

/// Beta dashboard over a [`CandleSource`].
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    universe: Universe,
    issued: AtomicU64,
    display: Mutex<Option<Arc<PlotFrame>>>,
}

impl<S: CandleSource> Dashboard<S> {
    /// Create a dashboard with nothing on display.
    pub const fn new(source: S, universe: Universe) -> Self {
        Self {
            source,
            universe,
            issued: AtomicU64::new(0),
            display: Mutex::new(None),
        }
    }

    /// Base symbol and alt allow-list.
    pub const fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Start a new cycle, superseding every earlier one.
    pub fn begin_cycle(&self) -> CycleId {
        CycleId(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Newest cycle started so far (0 before the first).
    pub fn latest_cycle(&self) -> CycleId {
        CycleId(self.issued.load(Ordering::SeqCst))
    }

    /// Frame currently on display.
    pub fn current(&self) -> Option<Arc<PlotFrame>> {
        self.display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a cycle for `request` and run it to completion.
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateOutcome> {
        let cycle = self.begin_cycle();
        self.run_cycle(cycle, request).await
    }

    /// Run an already started cycle.
    ///
    /// On error nothing is committed and the previous frame stays on display.
    pub async fn run_cycle(
        &self,
        cycle: CycleId,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome> {
        match self.compute_frame(cycle, request).await {
            Ok(frame) => Ok(self.commit(frame)),
            Err(err) => {
                error!(
                    %cycle,
                    interval = %request.interval,
                    %err,
                    "update cycle aborted, keeping previous plot"
                );
                Err(err)
            }
        }
    }

    /// Fetch every series for `request` and build the frame without committing it.
    pub async fn compute_frame(
        &self,
        cycle: CycleId,
        request: &UpdateRequest,
    ) -> Result<PlotFrame> {
        let alts = self.universe.select(request.symbols.as_slice())?;
        let base = self.universe.base();
        let interval = request.interval;

        let (base_prices, alt_prices) = futures::try_join!(
            self.source.fetch_closes(base, interval),
            try_join_all(alts.iter().map(|alt| self.source.fetch_closes(alt, interval))),
        )?;

        let base_returns = checked_returns(&base_prices)?;

        let mut traces = Vec::with_capacity(alts.len());
        let mut flagged = Vec::new();
        for (symbol, prices) in alts.into_iter().zip(alt_prices) {
            match regress(&base_returns, &prices) {
                Ok((returns, beta)) => {
                    traces.push(ScatterTrace::new(symbol, base_returns.clone(), returns, beta));
                }
                Err(err) => {
                    warn!(%cycle, %symbol, %err, "beta undefined, flagging asset");
                    flagged.push(FlaggedAsset {
                        symbol,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(PlotFrame {
            cycle: cycle.get(),
            interval,
            base: base.clone(),
            traces,
            flagged,
            layout: PlotLayout::for_base(base),
        })
    }

    /// Put `frame` on display unless a newer cycle has started.
    fn commit(&self, frame: PlotFrame) -> UpdateOutcome {
        let mut display = self.display.lock().unwrap_or_else(PoisonError::into_inner);
        let cycle = CycleId(frame.cycle);
        let latest = self.latest_cycle();
        if cycle < latest {
            warn!(%cycle, %latest, "discarding superseded cycle");
            return UpdateOutcome::Superseded { cycle, latest };
        }

        info!(
            %cycle,
            interval = %frame.interval,
            traces = frame.traces.len(),
            flagged = frame.flagged.len(),
            "plot updated"
        );
        let frame = Arc::new(frame);
        *display = Some(Arc::clone(&frame));
        UpdateOutcome::Applied(frame)
    }
}

/// Alt returns and their beta against `base_returns`.
///
/// Every error here is degenerate input for this one alt.
fn regress(
    base_returns: &ReturnSeries,
    prices: &PriceSeries,
) -> Result<(ReturnSeries, BetaEstimate)> {
    let returns = checked_returns(prices)?;
    let beta = estimate(base_returns, &returns)?;
    Ok((returns, beta))
}
