//! Signal to long/flat position resolution.
//!
//! Two corrections are decided from the original signals and applied together:
//! - a dangling buy (last action is a buy) forces a sell on the final date
//! - a leading sell (first action is a sell) is dropped
//!
//! The corrected signals are then filled forward: buy holds Long until the next
//! sell, sell holds Flat until the next buy, Flat before the first action.

use crate::domain::error::BacktestError;
use crate::domain::signal::{Signal, SignalSeries};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    #[default]
    Flat,
    Long,
}

impl Position {
    pub fn exposure(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPoint {
    pub date: NaiveDate,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSeries {
    pub points: Vec<PositionPoint>,
}

impl PositionSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.points.iter().map(|p| p.position)
    }

    pub fn last(&self) -> Option<Position> {
        self.points.last().map(|p| p.position)
    }
}

/// Applies forced liquidation and leading-sell suppression to a copy of `signals`.
pub fn correct_signals(signals: &SignalSeries) -> Result<SignalSeries, BacktestError> {
    let first_action = signals
        .points
        .iter()
        .position(|p| p.signal.is_action())
        .ok_or(BacktestError::EmptySignal)?;
    let last_action = signals
        .points
        .iter()
        .rposition(|p| p.signal.is_action())
        .ok_or(BacktestError::EmptySignal)?;

    let force_final_sell = signals.points[last_action].signal == Signal::Buy;
    let drop_leading_sell = signals.points[first_action].signal == Signal::Sell;

    let mut corrected = signals.clone();
    if drop_leading_sell {
        tracing::warn!(date = %corrected.points[first_action].date, "dropping leading sell");
        corrected.points[first_action].signal = Signal::Hold;
    }
    if force_final_sell {
        if let Some(last) = corrected.points.last_mut() {
            tracing::warn!(date = %last.date, "forcing sell of open position on final date");
            last.signal = Signal::Sell;
        }
    }

    Ok(corrected)
}

pub fn resolve_positions(signals: &SignalSeries) -> Result<PositionSeries, BacktestError> {
    let corrected = correct_signals(signals)?;
    Ok(fill_forward(&corrected))
}

/// Buy enters Long, sell exits to Flat, hold carries the previous state.
pub fn fill_forward(signals: &SignalSeries) -> PositionSeries {
    let mut current = Position::Flat;
    let points = signals
        .points
        .iter()
        .map(|p| {
            match p.signal {
                Signal::Buy => current = Position::Long,
                Signal::Sell => current = Position::Flat,
                Signal::Hold => {}
            }
            PositionPoint {
                date: p.date,
                position: current,
            }
        })
        .collect();
    PositionSeries { points }
}
