//! Core domain types and logic.

pub mod error;
pub mod price;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod strategy;
pub mod position;
pub mod portfolio;
pub mod metrics;
pub mod backtest;
pub mod sweep;
pub mod config_validation;
