//! Feature table for the next-day direction classifier.
//!
//! Features per bar: RSI(14), MACD line (12,26,9), EMA(10), EMA(50),
//! Bollinger upper/lower (20, 2.0), close-to-close return, volume.
//! Label: 1 when the next close is more than `up_threshold` above this close.
//! Rows with any undefined feature, and the final bar (no next close), are dropped.

use crate::domain::indicator::bollinger::{self, bands_at};
use crate::domain::indicator::macd::{self, macd_line_at};
use crate::domain::indicator::{IndicatorType, compute_indicators};
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub const FEATURE_NAMES: [&str; 8] = [
    "rsi", "macd", "ema_10", "ema_50", "bb_upper", "bb_lower", "returns", "volume",
];

pub const DEFAULT_UP_THRESHOLD: f64 = 0.001;

const RSI: IndicatorType = IndicatorType::Rsi(14);
const EMA_FAST: IndicatorType = IndicatorType::Ema(10);
const EMA_SLOW: IndicatorType = IndicatorType::Ema(50);
const MACD: IndicatorType = IndicatorType::Macd {
    fast: macd::DEFAULT_FAST,
    slow: macd::DEFAULT_SLOW,
    signal: macd::DEFAULT_SIGNAL,
};
const BBANDS: IndicatorType = IndicatorType::Bollinger {
    period: bollinger::DEFAULT_PERIOD,
    stddev_mult_x100: bollinger::DEFAULT_MULT_X100,
};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl FeatureTable {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            dates: Vec::new(),
            rows: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn push(&mut self, date: NaiveDate, row: Vec<f64>, label: u8) {
        debug_assert_eq!(row.len(), self.feature_names.len());
        self.dates.push(date);
        self.rows.push(row);
        self.labels.push(label);
    }

    pub fn n_samples(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            dates: self.dates[range.clone()].to_vec(),
            rows: self.rows[range.clone()].to_vec(),
            labels: self.labels[range].to_vec(),
        }
    }

    /// Ordered train/test split, no shuffling: the test set is the last
    /// `ceil(test_fraction * n)` rows. `None` if either side would be empty.
    pub fn split_chronological(&self, test_fraction: f64) -> Option<(Self, Self)> {
        let n = self.n_samples();
        let n_test = (test_fraction * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return None;
        }
        let n_train = n - n_test;
        Some((self.slice(0..n_train), self.slice(n_train..n)))
    }
}

pub fn build_feature_table(bars: &[OhlcvBar], up_threshold: f64) -> FeatureTable {
    let set = compute_indicators(bars, &[RSI, EMA_FAST, EMA_SLOW, MACD, BBANDS]);
    let mut table = FeatureTable::new(FEATURE_NAMES.iter().map(|s| s.to_string()).collect());

    for i in 1..bars.len().saturating_sub(1) {
        let row = (|| {
            let (bb_upper, bb_lower) = bands_at(&set[&BBANDS], i)?;
            let returns = bars[i].pct_change(bars[i - 1].close)?;
            Some(vec![
                set[&RSI].simple_at(i)?,
                macd_line_at(&set[&MACD], i)?,
                set[&EMA_FAST].simple_at(i)?,
                set[&EMA_SLOW].simple_at(i)?,
                bb_upper,
                bb_lower,
                returns,
                bars[i].volume as f64,
            ])
        })();
        let Some(row) = row.filter(|r| r.iter().all(|v| v.is_finite())) else {
            continue;
        };
        let Some(next_return) = bars[i + 1].pct_change(bars[i].close) else {
            continue;
        };
        let label = u8::from(next_return > up_threshold);
        table.push(bars[i].date, row, label);
    }

    table
}
