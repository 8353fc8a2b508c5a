//! Data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

/// Supplies cleaned adjusted-close history for a symbol.
pub trait DataPort {
    /// Prices with `start_date <= date <= end_date`, ordered by date.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, BacktestError>;

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError>;
}
