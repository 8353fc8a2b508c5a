#![allow(dead_code)]

use chrono::NaiveDate;
use crosstrader::domain::backtest::BacktestConfig;
use crosstrader::domain::error::BacktestError;
pub use crosstrader::domain::price::{PricePoint, PriceSeries};
use crosstrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, BacktestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::Data {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(symbol)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.date >= start_date && p.date <= end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(symbol, points)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily points starting at 2024-01-01.
pub fn make_points(closes: &[f64]) -> Vec<PricePoint> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &adj_close)| PricePoint {
            date: start + chrono::Duration::days(i as i64),
            adj_close,
        })
        .collect()
}

pub fn make_prices(symbol: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, make_points(closes)).unwrap()
}

/// Oscillating series with a mild drift, enough to trigger several crossovers.
pub fn wave_closes(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            100.0 + (t / 7.0).sin() * 8.0 + (t / 3.0).cos() * 2.0 + t * 0.03
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: Some(date(2024, 1, 1)),
        end_date: Some(date(2024, 12, 31)),
        ..BacktestConfig::default()
    }
}
