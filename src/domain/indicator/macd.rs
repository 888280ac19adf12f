//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: max(fast, slow) - 1 + signal - 1 bars. Points are defined only once
//! the signal line exists, so every defined point carries all three values.

use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };
    let Some(min_bars) = indicator_type.min_bars() else {
        return IndicatorSeries::undefined(indicator_type, bars);
    };
    if bars.len() < min_bars {
        return IndicatorSeries::undefined(indicator_type, bars);
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The line is defined from a fixed index onward; run the signal EMA over that tail.
    let line_start = line.iter().position(Option::is_some).unwrap_or(line.len());
    let tail: Vec<f64> = line[line_start..].iter().flatten().copied().collect();
    let mut signal_line = vec![None; line_start];
    signal_line.extend(ema_of(&tail, signal_period));

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = match (line[i], signal_line[i]) {
                (Some(line), Some(signal)) => Some(IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                }),
                _ => None,
            };
            IndicatorPoint {
                date: bar.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// The MACD line at `index`, if defined.
pub fn macd_line_at(series: &IndicatorSeries, index: usize) -> Option<f64> {
    match series.value_at(index)? {
        IndicatorValue::Macd { line, .. } => Some(line),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn macd_warmup_small_periods() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let series = calculate_macd(&bars, 2, 3, 2);
        // line from index 2, signal from index 3
        assert!(series.value_at(2).is_none());
        assert!(series.value_at(3).is_some());
        assert_eq!(series.len(), 7);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let series = calculate_macd_default(&make_bars(&prices));
        for point in &series.values {
            if let Some(IndicatorValue::Macd {
                line,
                signal,
                histogram,
            }) = point.value
            {
                assert!((histogram - (line - signal)).abs() < 1e-9);
            }
        }
        assert_eq!(series.defined_count(), 60 - 33);
    }

    #[test]
    fn macd_constant_prices_is_zero() {
        let series = calculate_macd_default(&make_bars(&[50.0; 40]));
        let line = macd_line_at(&series, 39).unwrap();
        assert!(line.abs() < 1e-9);
    }

    #[test]
    fn macd_insufficient_bars() {
        let series = calculate_macd_default(&make_bars(&[1.0; 33]));
        assert_eq!(series.len(), 33);
        assert!(series.is_all_undefined());
    }

    #[test]
    fn macd_zero_period() {
        let series = calculate_macd(&make_bars(&[1.0; 10]), 0, 3, 2);
        assert!(series.is_all_undefined());
    }
}
