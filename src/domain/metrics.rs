//! Performance metrics and statistics.
//!
//! Each metric is an independent function over a returns (or equity) slice.
//! Zero denominators are reported as `DegenerateStatistic` rather than
//! producing infinities or NaN.

use super::error::BacktestError;
use super::portfolio::{EquityCurve, ReturnsSeries};
use std::fmt;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
}

impl Metrics {
    pub fn compute(
        returns: &ReturnsSeries,
        equity: &EquityCurve,
        risk_free_rate: f64,
        periods_per_year: f64,
    ) -> Result<Self, BacktestError> {
        let rets = returns.values();

        Ok(Metrics {
            annualized_return: annualized_return(&rets, periods_per_year)?,
            annualized_volatility: annualized_volatility(&rets, periods_per_year)?,
            sharpe_ratio: sharpe_ratio(&rets, risk_free_rate, periods_per_year)?,
            max_drawdown: max_drawdown(&equity.values())?,
            win_rate: win_rate(&rets)?,
            profit_factor: profit_factor(&rets)?,
        })
    }

    /// Metrics table rows, in display order.
    pub fn table(&self) -> [(&'static str, f64); 6] {
        [
            ("Annualized Return", self.annualized_return),
            ("Annualized Volatility", self.annualized_volatility),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Max Drawdown", self.max_drawdown),
            ("Win Rate", self.win_rate),
            ("Profit Factor", self.profit_factor),
        ]
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.table() {
            writeln!(f, "{:<22} {:>10.4}", label, value)?;
        }
        Ok(())
    }
}

pub fn annualized_return(returns: &[f64], periods_per_year: f64) -> Result<f64, BacktestError> {
    if returns.is_empty() {
        return Err(BacktestError::degenerate("annualized_return", "no returns"));
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    Ok(growth.powf(periods_per_year / returns.len() as f64) - 1.0)
}

pub fn annualized_volatility(
    returns: &[f64],
    periods_per_year: f64,
) -> Result<f64, BacktestError> {
    let (_, stddev) = mean_and_population_stddev(returns)
        .ok_or_else(|| BacktestError::degenerate("annualized_volatility", "no returns"))?;
    Ok(stddev * periods_per_year.sqrt())
}

pub fn sharpe_ratio(
    returns: &[f64],
    risk_free_rate: f64,
    periods_per_year: f64,
) -> Result<f64, BacktestError> {
    let (mean, stddev) = mean_and_population_stddev(returns)
        .ok_or_else(|| BacktestError::degenerate("sharpe_ratio", "no returns"))?;
    if stddev == 0.0 {
        return Err(BacktestError::degenerate(
            "sharpe_ratio",
            "returns have zero standard deviation",
        ));
    }
    let excess_mean = mean - risk_free_rate / periods_per_year;
    Ok(excess_mean / stddev * periods_per_year.sqrt())
}

/// Largest peak-to-trough decline as a positive fraction of the running peak.
pub fn max_drawdown(equity: &[f64]) -> Result<f64, BacktestError> {
    let Some(&first) = equity.first() else {
        return Err(BacktestError::degenerate("max_drawdown", "empty equity curve"));
    };

    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        let drawdown = value / peak - 1.0;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    Ok(if worst < 0.0 { -worst } else { 0.0 })
}

/// Share of winning days among days with a non-zero return.
pub fn win_rate(returns: &[f64]) -> Result<f64, BacktestError> {
    let wins = returns.iter().filter(|&&r| r > 0.0).count();
    let losses = returns.iter().filter(|&&r| r < 0.0).count();
    if wins + losses == 0 {
        return Err(BacktestError::degenerate(
            "win_rate",
            "no winning or losing days",
        ));
    }
    Ok(wins as f64 / (wins + losses) as f64)
}

pub fn profit_factor(returns: &[f64]) -> Result<f64, BacktestError> {
    let gains: f64 = returns.iter().filter(|&&r| r > 0.0).sum();
    let losses: f64 = -returns.iter().filter(|&&r| r < 0.0).sum::<f64>();
    if losses == 0.0 {
        return Err(BacktestError::degenerate("profit_factor", "no losing days"));
    }
    Ok(gains / losses)
}

fn mean_and_population_stddev(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}
