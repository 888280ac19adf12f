//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, aligned to the input bars
//!
//! Every series has exactly one point per input bar. Points inside the warmup
//! window carry `value: None`. When the input is shorter than an indicator's
//! minimum history, every point is `None`.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Minimum number of bars needed before the first defined value appears.
    /// A zero period can never produce a value.
    pub fn min_bars(&self) -> Option<usize> {
        match *self {
            IndicatorType::Sma(n)
            | IndicatorType::Ema(n)
            | IndicatorType::Stddev(n)
            | IndicatorType::Bollinger { period: n, .. } => (n > 0).then_some(n),
            IndicatorType::Rsi(n) => (n > 0).then_some(n + 1),
            IndicatorType::Macd { fast, slow, signal } => {
                (fast > 0 && slow > 0 && signal > 0).then(|| fast.max(slow) + signal - 1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// A series with one undefined point per bar.
    pub fn undefined(indicator_type: IndicatorType, bars: &[OhlcvBar]) -> Self {
        Self {
            indicator_type,
            values: bars
                .iter()
                .map(|b| IndicatorPoint {
                    date: b.date,
                    value: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_all_undefined(&self) -> bool {
        self.values.iter().all(|p| p.value.is_none())
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    /// The scalar at `index`, if the point is defined and single-valued.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index)?.value? {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }

    pub fn value_at(&self, index: usize) -> Option<IndicatorValue> {
        self.values.get(index)?.value
    }
}

/// Computed indicators for one price series, keyed by kind and parameters.
pub type IndicatorSet = HashMap<IndicatorType, IndicatorSeries>;

pub fn compute_indicator(bars: &[OhlcvBar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => calculate_sma(bars, period),
        IndicatorType::Ema(period) => calculate_ema(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::Stddev(period) => stddev::calculate_stddev(bars, period),
        IndicatorType::Macd { fast, slow, signal } => calculate_macd(bars, fast, slow, signal),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

pub fn compute_indicators(bars: &[OhlcvBar], types: &[IndicatorType]) -> IndicatorSet {
    types
        .iter()
        .map(|t| (*t, compute_indicator(bars, *t)))
        .collect()
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
