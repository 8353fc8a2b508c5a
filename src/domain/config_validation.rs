//! Configuration validation and construction.
//!
//! Checks every `[backtest]` and `[strategy]` field before a run and builds
//! the typed [`BacktestConfig`] and [`Strategy`] from them.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::BacktestError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;
use crate::domain::portfolio::DEFAULT_INITIAL_WEALTH;
use crate::domain::strategy::{
    DEFAULT_LOWER_BAND, DEFAULT_RSI_LENGTH, DEFAULT_UPPER_BAND, Strategy,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const BACKTEST: &str = "backtest";
const STRATEGY: &str = "strategy";

/// Every `[backtest]` key is optional; absent keys take the defaults.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BacktestError> {
    let initial_wealth =
        optional_double(config, BACKTEST, "initial_wealth", DEFAULT_INITIAL_WEALTH)?;
    if initial_wealth <= 0.0 {
        return Err(invalid(BACKTEST, "initial_wealth", "initial_wealth must be positive"));
    }

    let risk_free_rate = optional_double(config, BACKTEST, "risk_free_rate", 0.0)?;
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            BACKTEST,
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let periods_per_year =
        optional_double(config, BACKTEST, "periods_per_year", TRADING_DAYS_PER_YEAR)?;
    if periods_per_year <= 0.0 {
        return Err(invalid(
            BACKTEST,
            "periods_per_year",
            "periods_per_year must be positive",
        ));
    }

    let start_date = optional_date(config, "start_date")?;
    let end_date = optional_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(invalid(
                BACKTEST,
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }

    Ok(BacktestConfig {
        start_date,
        end_date,
        initial_wealth,
        risk_free_rate,
        periods_per_year,
    })
}

/// Symbol named in `[backtest] symbol`, if any.
pub fn configured_symbol(config: &dyn ConfigPort) -> Option<String> {
    config
        .get_string(BACKTEST, "symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<Strategy, BacktestError> {
    let kind = config
        .get_string(STRATEGY, "kind")
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| missing(STRATEGY, "kind"))?;

    match kind.as_str() {
        "sma_crossover" => build_sma_crossover(config),
        "rsi_band" => build_rsi_band(config),
        other => Err(invalid(
            STRATEGY,
            "kind",
            format!("unknown strategy kind '{}', expected sma_crossover or rsi_band", other),
        )),
    }
}

fn build_sma_crossover(config: &dyn ConfigPort) -> Result<Strategy, BacktestError> {
    let fast = required_length(config, "fast")?;
    let slow = required_length(config, "slow")?;
    if fast >= slow {
        return Err(invalid(STRATEGY, "fast", "fast must be less than slow"));
    }
    Ok(Strategy::sma_crossover(fast, slow))
}

fn build_rsi_band(config: &dyn ConfigPort) -> Result<Strategy, BacktestError> {
    let length = match config.get_string(STRATEGY, "length") {
        None => DEFAULT_RSI_LENGTH,
        Some(_) => required_length(config, "length")?,
    };
    let lower = optional_double(config, STRATEGY, "lower_band", DEFAULT_LOWER_BAND)?;
    let upper = optional_double(config, STRATEGY, "upper_band", DEFAULT_UPPER_BAND)?;

    if !(0.0..=100.0).contains(&lower) {
        return Err(invalid(STRATEGY, "lower_band", "lower_band must be within 0..=100"));
    }
    if !(0.0..=100.0).contains(&upper) {
        return Err(invalid(STRATEGY, "upper_band", "upper_band must be within 0..=100"));
    }
    if lower >= upper {
        return Err(invalid(
            STRATEGY,
            "lower_band",
            "lower_band must be less than upper_band",
        ));
    }
    Ok(Strategy::rsi_band(length, lower, upper))
}

fn required_length(config: &dyn ConfigPort, key: &str) -> Result<usize, BacktestError> {
    if config.get_string(STRATEGY, key).is_none() {
        return Err(missing(STRATEGY, key));
    }
    // non-numeric values fall back to the sentinel and are rejected below
    let value = config.get_int(STRATEGY, key, -1);
    if value < 1 {
        return Err(invalid(
            STRATEGY,
            key,
            format!("{} must be a positive integer", key),
        ));
    }
    usize::try_from(value).map_err(|_| invalid(STRATEGY, key, format!("{} is too large", key)))
}

fn optional_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, BacktestError> {
    if config.get_string(section, key).is_none() {
        return Ok(default);
    }
    let value = config.get_double(section, key, f64::NAN);
    if !value.is_finite() {
        return Err(invalid(section, key, format!("{} must be a number", key)));
    }
    Ok(value)
}

fn optional_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string(BACKTEST, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    BACKTEST,
                    key,
                    format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

fn missing(section: &str, key: &str) -> BacktestError {
    BacktestError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
