//! algotrader: daily-bar trading pipeline.
//!
//! Fetches prices per ticker, backtests an RSI + moving-average crossover
//! rule over a trailing window, trains a next-day direction classifier and
//! publishes trade logs and a summary table.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
