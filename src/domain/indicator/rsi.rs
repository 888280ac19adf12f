//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of the first n close-to-close gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100, unless avg_gain is also 0 (flat prices), then 50.
//!
//! Warmup: first n bars are undefined (need n price changes for the seed).
//! Fewer than n + 1 bars yields an all-undefined series.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < period + 1 {
        return IndicatorSeries::undefined(IndicatorType::Rsi(period), bars);
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint {
        date: bars[0].date,
        value: None,
    });

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let change_idx = i - 1;

        let value = if change_idx + 1 < period {
            None
        } else if change_idx + 1 == period {
            avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
            avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
            Some(rsi_from_averages(avg_gain, avg_loss))
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[change_idx]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[change_idx]) / period as f64;
            Some(rsi_from_averages(avg_gain, avg_loss))
        };

        values.push(IndicatorPoint {
            date: bar.date,
            value: value.map(IndicatorValue::Simple),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 14);
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn rsi_single_bar() {
        let bars = make_bars(&[100.0]);
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.len(), 1);
        assert!(series.is_all_undefined());
    }

    #[test]
    fn rsi_exactly_period_bars_is_all_undefined() {
        let bars = make_bars(&[100.0; 14]);
        let series = calculate_rsi(&bars, 14);
        assert_eq!(series.len(), 14);
        assert!(series.is_all_undefined());
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        assert_eq!(series.len(), 15);
        for i in 0..14 {
            assert!(series.simple_at(i).is_none(), "Bar {} should be undefined", i);
        }
        assert!(series.simple_at(14).is_some(), "Bar 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert!((series.simple_at(14).unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        let series = calculate_rsi(&make_bars(&prices), 14);
        assert!(series.simple_at(14).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_prices_is_neutral() {
        let series = calculate_rsi(&make_bars(&[100.0; 20]), 14);
        assert_eq!(series.simple_at(19), Some(50.0));
    }

    #[test]
    fn rsi_in_range() {
        let prices: Vec<f64> = (1..=40)
            .map(|i| 100.0 + (i as f64 % 7.0 - 3.0) * 2.0)
            .collect();
        let series = calculate_rsi(&make_bars(&prices), 14);

        for i in 0..series.len() {
            if let Some(rsi) = series.simple_at(i) {
                assert!((0.0..=100.0).contains(&rsi), "RSI {} out of range", rsi);
            }
        }
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // period 2: changes +2, -1, +3
        let series = calculate_rsi(&make_bars(&[10.0, 12.0, 11.0, 14.0]), 2);
        // seed: gain 1.0, loss 0.5 -> RS 2 -> 66.67
        let seed = series.simple_at(2).unwrap();
        assert!((seed - 200.0 / 3.0).abs() < 1e-9);
        // next: gain (1*1 + 3)/2 = 2, loss (0.5*1 + 0)/2 = 0.25 -> RS 8 -> 88.89
        let next = series.simple_at(3).unwrap();
        assert!((next - (100.0 - 100.0 / 9.0)).abs() < 1e-9);
    }

    #[test]
    fn rsi_zero_period() {
        let bars = make_bars(&[100.0, 101.0]);
        let series = calculate_rsi(&bars, 0);
        assert_eq!(series.len(), 2);
        assert!(series.is_all_undefined());
    }

    #[test]
    fn rsi_known_calculation() {
        let bars = make_bars(&[
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ]);
        let series = calculate_rsi(&bars, 14);
        let rsi = series.simple_at(14).unwrap();
        assert!(rsi > 50.0 && rsi < 100.0, "RSI should be in bullish territory");
    }
}
