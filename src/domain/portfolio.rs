//! Strategy returns and equity compounding.

use chrono::NaiveDate;

use super::error::BacktestError;
use super::position::PositionSeries;
use super::price::PriceSeries;

pub const DEFAULT_INITIAL_WEALTH: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnsSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnsSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityCurve {
    pub initial_wealth: f64,
    pub points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.equity).collect()
    }

    pub fn final_equity(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_wealth)
    }

    pub fn total_return(&self) -> f64 {
        self.final_equity() / self.initial_wealth - 1.0
    }
}

/// Daily simple returns earned by holding yesterday's position over today's price move.
///
/// The first date earns nothing: there is neither a prior price nor a prior position
/// within the position range.
pub fn strategy_returns(
    prices: &PriceSeries,
    positions: &PositionSeries,
) -> Result<ReturnsSeries, BacktestError> {
    let Some(first) = positions.points.first() else {
        return Ok(ReturnsSeries::default());
    };
    let start = prices
        .index_of(first.date)
        .ok_or(BacktestError::Misaligned { date: first.date })?;
    let price_points = &prices.points()[start..];

    let mut points = Vec::with_capacity(positions.len());
    for (k, point) in positions.points.iter().enumerate() {
        let price = price_points
            .get(k)
            .filter(|p| p.date == point.date)
            .ok_or(BacktestError::Misaligned { date: point.date })?;

        let value = if k == 0 {
            0.0
        } else {
            let prev_close = price_points[k - 1].adj_close;
            let price_return = price.adj_close / prev_close - 1.0;
            price_return * positions.points[k - 1].position.exposure()
        };

        points.push(ReturnPoint {
            date: point.date,
            value,
        });
    }

    Ok(ReturnsSeries { points })
}

/// `initial_wealth * prod(1 + r)` up to and including each date.
pub fn equity_curve(returns: &ReturnsSeries, initial_wealth: f64) -> EquityCurve {
    let mut equity = initial_wealth;
    let points = returns
        .points
        .iter()
        .map(|r| {
            equity *= 1.0 + r.value;
            EquityPoint {
                date: r.date,
                equity,
            }
        })
        .collect();

    EquityCurve {
        initial_wealth,
        points,
    }
}
