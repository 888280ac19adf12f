//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::stddev::window_mean_stddev;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    if period == 0 || bars.len() < period {
        return IndicatorSeries::undefined(indicator_type, bars);
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let values = (0..bars.len())
        .map(|i| IndicatorPoint {
            date: bars[i].date,
            value: window_mean_stddev(bars, i, period).map(|(middle, sd)| {
                IndicatorValue::Bollinger {
                    upper: middle + mult * sd,
                    middle,
                    lower: middle - mult * sd,
                }
            }),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

/// Upper and lower band at `index`, if defined.
pub fn bands_at(series: &IndicatorSeries, index: usize) -> Option<(f64, f64)> {
    match series.value_at(index)? {
        IndicatorValue::Bollinger { upper, lower, .. } => Some((upper, lower)),
        _ => None,
    }
}
