//! Oversold-in-uptrend signal rule.
//!
//! At each bar where the oscillator and both moving averages are defined:
//! 1. default HOLD
//! 2. short MA < long MA → SELL
//! 3. RSI < oversold AND short MA > long MA → BUY (assigned after SELL, so it wins)
//!
//! The MA comparisons in rules 2 and 3 are mutually exclusive, and equal MAs
//! match neither, so the assignment order only matters if the conditions are
//! ever widened. It is kept as written: SELL first, BUY overwrites.
//!
//! Bars with any undefined input are dropped from the output, not defaulted.

use crate::domain::indicator::{IndicatorSet, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sell = -1,
    Hold = 0,
    Buy = 1,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
            Signal::Buy => write!(f, "BUY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub rsi_period: usize,
    pub short_window: usize,
    pub long_window: usize,
    pub oversold: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            short_window: 20,
            long_window: 50,
            oversold: 30.0,
        }
    }
}

impl StrategyParams {
    pub fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_period)
    }

    pub fn short_ma(&self) -> IndicatorType {
        IndicatorType::Sma(self.short_window)
    }

    pub fn long_ma(&self) -> IndicatorType {
        IndicatorType::Sma(self.long_window)
    }

    pub fn indicator_types(&self) -> [IndicatorType; 3] {
        [self.rsi(), self.short_ma(), self.long_ma()]
    }

    /// Bars needed before every input to the rule is defined.
    pub fn min_bars(&self) -> usize {
        self.indicator_types()
            .iter()
            .filter_map(IndicatorType::min_bars)
            .max()
            .unwrap_or(0)
    }
}

/// One bar that survived the undefined-input filter, with its signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub rsi: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub signal: Signal,
}

pub fn classify(rsi: f64, short_ma: f64, long_ma: f64, oversold: f64) -> Signal {
    let mut signal = Signal::Hold;
    if short_ma < long_ma {
        signal = Signal::Sell;
    }
    if rsi < oversold && short_ma > long_ma {
        signal = Signal::Buy;
    }
    signal
}

pub fn generate_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    params: &StrategyParams,
) -> Vec<SignalRow> {
    let (Some(rsi), Some(short), Some(long)) = (
        indicators.get(&params.rsi()),
        indicators.get(&params.short_ma()),
        indicators.get(&params.long_ma()),
    ) else {
        return Vec::new();
    };

    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

    bars.iter()
        .enumerate()
        .filter_map(|(i, bar)| {
            let rsi = finite(rsi.simple_at(i))?;
            let short_ma = finite(short.simple_at(i))?;
            let long_ma = finite(long.simple_at(i))?;
            if !bar.open.is_finite() || !bar.close.is_finite() {
                return None;
            }
            Some(SignalRow {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                rsi,
                short_ma,
                long_ma,
                signal: classify(rsi, short_ma, long_ma, params.oversold),
            })
        })
        .collect()
}

/// (buy, sell, hold) counts.
pub fn signal_counts(rows: &[SignalRow]) -> (usize, usize, usize) {
    rows.iter().fold((0, 0, 0), |(b, s, h), row| match row.signal {
        Signal::Buy => (b + 1, s, h),
        Signal::Sell => (b, s + 1, h),
        Signal::Hold => (b, s, h + 1),
    })
}
