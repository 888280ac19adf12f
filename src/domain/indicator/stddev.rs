//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period {
        return IndicatorSeries::undefined(IndicatorType::Stddev(period), bars);
    }

    let values = (0..bars.len())
        .map(|i| IndicatorPoint {
            date: bars[i].date,
            value: window_mean_stddev(bars, i, period)
                .map(|(_, sd)| IndicatorValue::Simple(sd)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

/// Mean and population standard deviation of the `period` closes ending at `end`.
pub(crate) fn window_mean_stddev(
    bars: &[OhlcvBar],
    end: usize,
    period: usize,
) -> Option<(f64, f64)> {
    if period == 0 || end + 1 < period || end >= bars.len() {
        return None;
    }
    let window = &bars[end + 1 - period..=end];
    let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / period as f64;
    Some((mean, variance.sqrt()))
}
