//! Simple Moving Average indicator.
//!
//! O(n) sliding window over adjusted closes.
//! SMA(n) = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) points are missing.

use crate::domain::error::BacktestError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceSeries;

pub fn calculate_sma(
    prices: &PriceSeries,
    period: usize,
) -> Result<IndicatorSeries, BacktestError> {
    if period == 0 {
        return Err(BacktestError::invalid("SMA length must be positive"));
    }

    let points = prices.points();
    let mut values = Vec::with_capacity(points.len());
    let mut window_sum: f64 = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i < period {
            window_sum += point.adj_close;
        } else {
            window_sum += point.adj_close - points[i - period].adj_close;
        }

        let valid = i + 1 >= period;
        values.push(IndicatorPoint {
            date: point.date,
            value: valid.then(|| window_sum / period as f64),
        });
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    })
}
