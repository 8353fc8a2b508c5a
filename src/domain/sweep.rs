//! Parameter sweep over strategy grids.
//!
//! Every combination runs the full pipeline independently against the same
//! borrowed price series. A failing combination is recorded in its own outcome
//! and never aborts the rest.

use rayon::prelude::*;

use super::backtest::{BacktestConfig, BacktestResult, run_backtest};
use super::error::BacktestError;
use super::metrics::Metrics;
use super::price::PriceSeries;
use super::strategy::Strategy;

/// Strategy grids. Every combination is produced, including invalid ones,
/// so they surface as failed outcomes instead of disappearing silently.
pub struct ParamGrid;

impl ParamGrid {
    pub fn sma_crossover(fast_lengths: &[usize], slow_lengths: &[usize]) -> Vec<Strategy> {
        fast_lengths
            .iter()
            .flat_map(|&fast| {
                slow_lengths
                    .iter()
                    .map(move |&slow| Strategy::sma_crossover(fast, slow))
            })
            .collect()
    }

    /// `bands` are (lower, upper) pairs.
    pub fn rsi_band(lengths: &[usize], bands: &[(f64, f64)]) -> Vec<Strategy> {
        lengths
            .iter()
            .flat_map(|&length| {
                bands
                    .iter()
                    .map(move |&(lower, upper)| Strategy::rsi_band(length, lower, upper))
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct SweepOutcome {
    pub strategy: Strategy,
    pub result: Result<BacktestResult, BacktestError>,
}

impl SweepOutcome {
    pub fn metrics(&self) -> Option<&Metrics> {
        self.result.as_ref().ok().map(|r| &r.metrics)
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one backtest per strategy in parallel. Output order matches `strategies`.
pub fn run_sweep(
    prices: &PriceSeries,
    strategies: &[Strategy],
    config: &BacktestConfig,
) -> Vec<SweepOutcome> {
    let outcomes: Vec<SweepOutcome> = strategies
        .par_iter()
        .map(|strategy| {
            let result = run_backtest(prices, strategy, config);
            if let Err(e) = &result {
                tracing::warn!(strategy = %strategy, error = %e, "sweep entry failed");
            }
            SweepOutcome {
                strategy: strategy.clone(),
                result,
            }
        })
        .collect();

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    tracing::info!(
        symbol = prices.symbol(),
        total = outcomes.len(),
        succeeded,
        "sweep complete"
    );
    outcomes
}

/// Successful outcomes ordered by Sharpe ratio, best first.
///
/// An outcome is ranked only when its whole metrics table computed. A
/// strategy whose returns leave a statistic undefined (no losing days leaves
/// no profit factor) is a failed outcome and does not appear here.
pub fn rank_by_sharpe(outcomes: &[SweepOutcome]) -> Vec<&SweepOutcome> {
    let mut ranked: Vec<&SweepOutcome> = outcomes.iter().filter(|o| o.is_ok()).collect();
    ranked.sort_by(|a, b| {
        let sa = a.metrics().map_or(f64::NEG_INFINITY, |m| m.sharpe_ratio);
        let sb = b.metrics().map_or(f64::NEG_INFINITY, |m| m.sharpe_ratio);
        sb.total_cmp(&sa)
    });
    ranked
}
