//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let raw = ema_of(&closes, period);

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values: bars
            .iter()
            .zip(raw)
            .map(|(bar, v)| IndicatorPoint {
                date: bar.date,
                value: v.map(IndicatorValue::Simple),
            })
            .collect(),
    }
}

/// EMA over an arbitrary input slice, one output per input.
pub(crate) fn ema_of(inputs: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || inputs.len() < period {
        return vec![None; inputs.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(inputs.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in inputs.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}
