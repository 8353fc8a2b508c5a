//! Backtest pipeline: prices -> indicators -> signal -> position -> returns/equity -> metrics.
//!
//! BacktestConfig defines the parameters shared by every stage.

use chrono::NaiveDate;

use super::error::BacktestError;
use super::indicator::IndicatorSet;
use super::indicator_helpers::compute_indicators;
use super::metrics::{Metrics, TRADING_DAYS_PER_YEAR};
use super::portfolio::{
    DEFAULT_INITIAL_WEALTH, EquityCurve, ReturnsSeries, equity_curve, strategy_returns,
};
use super::position::{PositionSeries, correct_signals, fill_forward};
use super::price::PriceSeries;
use super::signal::SignalSeries;
use super::strategy::{SignalGenerator, SignalMetadata, Strategy};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_wealth: f64,
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            initial_wealth: DEFAULT_INITIAL_WEALTH,
            risk_free_rate: 0.0,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacktestError> {
        if !(self.initial_wealth > 0.0) {
            return Err(BacktestError::invalid("initial wealth must be positive"));
        }
        if !(self.periods_per_year > 0.0) {
            return Err(BacktestError::invalid("periods per year must be positive"));
        }
        if !self.risk_free_rate.is_finite() {
            return Err(BacktestError::invalid("risk-free rate must be finite"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(BacktestError::invalid(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(())
    }
}

/// Aligned outputs of one pipeline run, read-only for downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub symbol: String,
    pub indicators: IndicatorSet,
    /// Signals after forced liquidation and leading-sell suppression.
    pub signals: SignalSeries,
    pub metadata: SignalMetadata,
    pub positions: PositionSeries,
    pub returns: ReturnsSeries,
    pub equity: EquityCurve,
    pub metrics: Metrics,
}

pub fn run_backtest(
    prices: &PriceSeries,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    strategy.validate()?;

    let indicators = compute_indicators(prices, &strategy.required_indicators())?;
    let generated = strategy.generate(prices, &indicators)?;
    tracing::debug!(
        symbol = prices.symbol(),
        strategy = %strategy,
        rows = generated.signals.len(),
        "generated signals"
    );

    let signals = correct_signals(&generated.signals)?;
    let positions = fill_forward(&signals);
    let returns = strategy_returns(prices, &positions)?;
    let equity = equity_curve(&returns, config.initial_wealth);
    let metrics = Metrics::compute(
        &returns,
        &equity,
        config.risk_free_rate,
        config.periods_per_year,
    )?;

    tracing::info!(
        symbol = prices.symbol(),
        strategy = %strategy,
        final_equity = equity.final_equity(),
        total_return = equity.total_return(),
        sharpe = metrics.sharpe_ratio,
        "backtest complete"
    );

    Ok(BacktestResult {
        symbol: prices.symbol().to_string(),
        indicators,
        signals,
        metadata: generated.metadata,
        positions,
        returns,
        equity,
        metrics,
    })
}

/// Fetches `symbol` over the configured date range, then runs the pipeline.
pub fn run_backtest_for_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    let start = config.start_date.unwrap_or(NaiveDate::MIN);
    let end = config.end_date.unwrap_or(NaiveDate::MAX);

    let prices = data_port.fetch_prices(symbol, start, end)?;
    tracing::info!(symbol, points = prices.len(), "loaded prices");

    run_backtest(&prices, strategy, config)
}
