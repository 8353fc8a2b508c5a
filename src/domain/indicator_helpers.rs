//! Shared helpers for indicator calculations.

use crate::domain::error::BacktestError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{IndicatorSeries, IndicatorSet, IndicatorType};
use crate::domain::price::PriceSeries;

pub fn calculate(
    prices: &PriceSeries,
    indicator_type: IndicatorType,
) -> Result<IndicatorSeries, BacktestError> {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(prices, period),
        IndicatorType::Rsi(period) => calculate_rsi(prices, period),
    }
}

/// Computes each distinct requested indicator once over `prices`.
pub fn compute_indicators(
    prices: &PriceSeries,
    indicator_types: &[IndicatorType],
) -> Result<IndicatorSet, BacktestError> {
    let mut set = IndicatorSet::new();
    for &indicator_type in indicator_types {
        if set.contains(indicator_type) {
            continue;
        }
        set.insert(calculate(prices, indicator_type)?);
    }
    tracing::debug!(
        symbol = prices.symbol(),
        columns = set.len(),
        "computed indicators"
    );
    Ok(set)
}

/// First row on which every series is defined. Warm-ups are leading prefixes,
/// so all later rows are defined as well.
pub fn first_common_valid(series: &[&IndicatorSeries]) -> Option<usize> {
    let len = series.iter().map(|s| s.len()).min()?;
    (0..len).find(|&i| series.iter().all(|s| s.value_at(i).is_some()))
}
