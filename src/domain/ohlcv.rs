//! Daily OHLCV bars and price series invariants.

use crate::domain::error::AlgoError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl OhlcvBar {
    /// Close-to-close percentage change against the previous bar.
    /// `None` when the previous close is zero or non-finite.
    pub fn pct_change(&self, prev_close: f64) -> Option<f64> {
        pct_change(prev_close, self.close)
    }
}

/// Percentage change from `prev` to `curr`; `None` when `prev` is zero or
/// non-finite.
pub fn pct_change(prev: f64, curr: f64) -> Option<f64> {
    if prev == 0.0 || !prev.is_finite() {
        return None;
    }
    let change = (curr - prev) / prev;
    change.is_finite().then_some(change)
}

/// Checks that dates are strictly increasing (which also rules out duplicates).
pub fn validate_series(ticker: &str, bars: &[OhlcvBar]) -> Result<(), AlgoError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(AlgoError::UnorderedSeries {
                ticker: ticker.to_string(),
                date: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Sorts by date and keeps the last bar seen for any duplicated date.
pub fn normalize_series(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Bars dated on or after `start`.
pub fn trailing_window(bars: &[OhlcvBar], start: NaiveDate) -> &[OhlcvBar] {
    let first = bars.partition_point(|b| b.date < start);
    &bars[first..]
}
