//! Core domain types and logic.

pub mod backtest;
pub mod classifier;
pub mod config_validation;
pub mod error;
pub mod features;
pub mod indicator;
pub mod ohlcv;
pub mod performance;
pub mod position;
pub mod signal;
pub mod table;
pub mod trade_log;
