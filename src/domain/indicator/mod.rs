//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values aligned with a price series
//! - `IndicatorSet`: Several series computed over the same prices, keyed by type

pub mod rsi;
pub mod sma;

use crate::domain::error::BacktestError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// One indicator observation. `value` is `None` inside the warm-up period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl IndicatorPoint {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(IndicatorPoint::is_valid)
    }
}

/// Column names follow the `sma_10` / `RSI_14` convention.
impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "sma_{}", period),
            IndicatorType::Rsi(period) => write!(f, "RSI_{}", period),
        }
    }
}

/// Indicator columns computed over one price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: IndicatorSeries) {
        self.series.insert(series.indicator_type, series);
    }

    pub fn contains(&self, indicator_type: IndicatorType) -> bool {
        self.series.contains_key(&indicator_type)
    }

    pub fn get(&self, indicator_type: IndicatorType) -> Result<&IndicatorSeries, BacktestError> {
        self.series
            .get(&indicator_type)
            .ok_or_else(|| BacktestError::MissingColumn {
                column: indicator_type.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSeries> {
        self.series.values()
    }
}
