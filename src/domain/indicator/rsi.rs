//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation, in its recursive
//! exponential form with alpha = 1/n:
//! - Seed: the first bar's change is taken as 0, so avg[0] = 0
//! - Subsequent: avg = prev_avg * (1 - alpha) + current * alpha
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n points are missing. The recursion itself produces values
//! from the first bar, so they are masked explicitly.

use crate::domain::error::BacktestError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PriceSeries;

pub fn calculate_rsi(
    prices: &PriceSeries,
    period: usize,
) -> Result<IndicatorSeries, BacktestError> {
    if period == 0 {
        return Err(BacktestError::invalid("RSI length must be positive"));
    }

    let alpha = 1.0 / period as f64;
    let points = prices.points();
    let mut values = Vec::with_capacity(points.len());

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, point) in points.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            point.adj_close - points[i - 1].adj_close
        };
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = avg_gain * (1.0 - alpha) + gain * alpha;
            avg_loss = avg_loss * (1.0 - alpha) + loss * alpha;
        }

        let value = if i < period {
            None
        } else {
            Some(rsi_from_averages(avg_gain, avg_loss))
        };

        values.push(IndicatorPoint {
            date: point.date,
            value,
        });
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    })
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
