//! Signal-generating strategies.
//!
//! A closed set of variants behind the [`SignalGenerator`] contract. Each variant
//! reads precomputed indicator columns and emits a [`SignalSeries`] starting on the
//! first date where all of its columns are defined.

use crate::domain::error::BacktestError;
use crate::domain::indicator::{IndicatorSeries, IndicatorSet, IndicatorType};
use crate::domain::indicator_helpers::first_common_valid;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{Signal, SignalPoint, SignalSeries};
use std::fmt;

pub const DEFAULT_RSI_LENGTH: usize = 14;
pub const DEFAULT_LOWER_BAND: f64 = 30.0;
pub const DEFAULT_UPPER_BAND: f64 = 70.0;

/// Display-only description of how a signal was produced. Never read by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMetadata {
    pub strategy: String,
    pub indicators: Vec<IndicatorType>,
    /// (lower, upper) RSI thresholds, for band strategies.
    pub bands: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSignal {
    pub signals: SignalSeries,
    pub metadata: SignalMetadata,
}

pub trait SignalGenerator {
    fn required_indicators(&self) -> Vec<IndicatorType>;

    fn validate(&self) -> Result<(), BacktestError>;

    fn generate(
        &self,
        prices: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<GeneratedSignal, BacktestError>;
}

/// Buy when the fast SMA crosses above the slow one, sell on the cross back below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    pub fast: usize,
    pub slow: usize,
}

/// Buy on RSI rising through the upper band, sell on RSI falling through the lower band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiBand {
    pub length: usize,
    pub lower_band: f64,
    pub upper_band: f64,
}

impl RsiBand {
    pub fn with_default_bands(length: usize) -> Self {
        Self {
            length,
            lower_band: DEFAULT_LOWER_BAND,
            upper_band: DEFAULT_UPPER_BAND,
        }
    }
}

impl Default for RsiBand {
    fn default() -> Self {
        Self::with_default_bands(DEFAULT_RSI_LENGTH)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    SmaCrossover(SmaCrossover),
    RsiBand(RsiBand),
}

impl Strategy {
    pub fn sma_crossover(fast: usize, slow: usize) -> Self {
        Strategy::SmaCrossover(SmaCrossover { fast, slow })
    }

    pub fn rsi_band(length: usize, lower_band: f64, upper_band: f64) -> Self {
        Strategy::RsiBand(RsiBand {
            length,
            lower_band,
            upper_band,
        })
    }

    fn generator(&self) -> &dyn SignalGenerator {
        match self {
            Strategy::SmaCrossover(s) => s as &dyn SignalGenerator,
            Strategy::RsiBand(s) => s as &dyn SignalGenerator,
        }
    }
}

impl SignalGenerator for Strategy {
    fn required_indicators(&self) -> Vec<IndicatorType> {
        self.generator().required_indicators()
    }

    fn validate(&self) -> Result<(), BacktestError> {
        self.generator().validate()
    }

    fn generate(
        &self,
        prices: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<GeneratedSignal, BacktestError> {
        self.generator().generate(prices, indicators)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SmaCrossover(s) => write!(f, "SMA crossover ({}/{})", s.fast, s.slow),
            Strategy::RsiBand(s) => write!(
                f,
                "RSI band ({}, {}/{})",
                s.length, s.lower_band, s.upper_band
            ),
        }
    }
}

impl SignalGenerator for SmaCrossover {
    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Sma(self.fast), IndicatorType::Sma(self.slow)]
    }

    fn validate(&self) -> Result<(), BacktestError> {
        if self.fast == 0 || self.slow == 0 {
            return Err(BacktestError::invalid("SMA lengths must be positive"));
        }
        if self.fast >= self.slow {
            return Err(BacktestError::invalid(format!(
                "fast length ({}) must be < slow length ({})",
                self.fast, self.slow
            )));
        }
        Ok(())
    }

    fn generate(
        &self,
        prices: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<GeneratedSignal, BacktestError> {
        self.validate()?;
        let fast = aligned_column(prices, indicators, IndicatorType::Sma(self.fast))?;
        let slow = aligned_column(prices, indicators, IndicatorType::Sma(self.slow))?;

        let start = first_common_valid(&[fast, slow]).unwrap_or(prices.len());
        let mut points = Vec::with_capacity(prices.len() - start);
        let mut prev_above: Option<bool> = None;

        for (i, price) in prices.points().iter().enumerate().skip(start) {
            let (Some(f), Some(s)) = (fast.value_at(i), slow.value_at(i)) else {
                continue;
            };
            let above = f > s;
            let signal = match (above, prev_above) {
                (true, Some(true)) | (false, Some(false)) => Signal::Hold,
                (true, _) => Signal::Buy,
                (false, _) => Signal::Sell,
            };
            points.push(SignalPoint {
                date: price.date,
                signal,
            });
            prev_above = Some(above);
        }

        Ok(GeneratedSignal {
            signals: SignalSeries::new(points),
            metadata: SignalMetadata {
                strategy: Strategy::SmaCrossover(*self).to_string(),
                indicators: self.required_indicators(),
                bands: None,
            },
        })
    }
}

impl SignalGenerator for RsiBand {
    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![IndicatorType::Rsi(self.length)]
    }

    fn validate(&self) -> Result<(), BacktestError> {
        if self.length == 0 {
            return Err(BacktestError::invalid("RSI length must be positive"));
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.lower_band) || !in_range(self.upper_band) {
            return Err(BacktestError::invalid("RSI bands must lie within [0, 100]"));
        }
        if self.lower_band >= self.upper_band {
            return Err(BacktestError::invalid(format!(
                "lower band ({}) must be < upper band ({})",
                self.lower_band, self.upper_band
            )));
        }
        Ok(())
    }

    fn generate(
        &self,
        prices: &PriceSeries,
        indicators: &IndicatorSet,
    ) -> Result<GeneratedSignal, BacktestError> {
        self.validate()?;
        let rsi = aligned_column(prices, indicators, IndicatorType::Rsi(self.length))?;

        let start = first_common_valid(&[rsi]).unwrap_or(prices.len());
        let mut points = Vec::with_capacity(prices.len() - start);
        let mut prev_above: Option<bool> = None;
        let mut prev_below: Option<bool> = None;
        // Held direction: 1 after a bullish event, -1 after a bearish one.
        let mut held: i32 = 0;

        for (i, price) in prices.points().iter().enumerate().skip(start) {
            let Some(value) = rsi.value_at(i) else {
                continue;
            };
            let above = value > self.upper_band;
            let below = value < self.lower_band;
            // an edge needs a defined prior row, so the first row never fires
            let bullish = above && prev_above == Some(false);
            let bearish = below && prev_below == Some(false);

            let prev_held = held;
            if bullish {
                held = 1;
            } else if bearish {
                held = -1;
            }

            points.push(SignalPoint {
                date: price.date,
                signal: Signal::from_clamped(held - prev_held),
            });
            prev_above = Some(above);
            prev_below = Some(below);
        }

        Ok(GeneratedSignal {
            signals: SignalSeries::new(points),
            metadata: SignalMetadata {
                strategy: Strategy::RsiBand(*self).to_string(),
                indicators: self.required_indicators(),
                bands: Some((self.lower_band, self.upper_band)),
            },
        })
    }
}

fn aligned_column<'a>(
    prices: &PriceSeries,
    indicators: &'a IndicatorSet,
    indicator_type: IndicatorType,
) -> Result<&'a IndicatorSeries, BacktestError> {
    let series = indicators.get(indicator_type)?;
    let points = prices.points();

    if let Some(point) = points
        .iter()
        .zip(&series.values)
        .find(|(p, v)| p.date != v.date)
        .map(|(p, _)| p)
    {
        return Err(BacktestError::Misaligned { date: point.date });
    }
    if series.len() < points.len() {
        return Err(BacktestError::Misaligned {
            date: points[series.len()].date,
        });
    }
    if series.len() > points.len() {
        return Err(BacktestError::Misaligned {
            date: series.values[points.len()].date,
        });
    }
    Ok(series)
}
