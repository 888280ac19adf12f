//! Position simulation: forward-filled signals delayed by one bar.

use crate::domain::ohlcv::pct_change;
use crate::domain::signal::{Signal, SignalRow};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    /// No BUY or SELL has been seen yet. Treated as flat.
    NoPositionYet,
    Flat,
    InPosition,
}

impl PositionState {
    pub fn is_in_position(self) -> bool {
        self == PositionState::InPosition
    }

    /// Exposure multiplier applied to the bar's market return.
    pub fn weight(self) -> f64 {
        if self.is_in_position() { 1.0 } else { 0.0 }
    }

    /// HOLD carries the previous state forward.
    pub fn apply(self, signal: Signal) -> Self {
        match signal {
            Signal::Buy => PositionState::InPosition,
            Signal::Sell => PositionState::Flat,
            Signal::Hold => self,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub date: NaiveDate,
    pub state: PositionState,
    /// Close-to-close return of this bar. Undefined on the first row.
    pub market_return: Option<f64>,
    /// `market_return * state.weight()`.
    pub strategy_return: Option<f64>,
}

/// Forward-fill of non-HOLD signals, before the execution delay.
pub fn forward_fill(rows: &[SignalRow]) -> Vec<PositionState> {
    rows.iter()
        .scan(PositionState::NoPositionYet, |state, row| {
            *state = state.apply(row.signal);
            Some(*state)
        })
        .collect()
}

/// The state effective at bar t is the filled state as of bar t-1.
pub fn simulate_positions(rows: &[SignalRow]) -> Vec<PositionRow> {
    let filled = forward_fill(rows);

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let state = if i == 0 {
                PositionState::NoPositionYet
            } else {
                filled[i - 1]
            };
            let market_return = (i > 0)
                .then(|| pct_change(rows[i - 1].close, row.close))
                .flatten();
            PositionRow {
                date: row.date,
                state,
                market_return,
                strategy_return: market_return.map(|r| r * state.weight()),
            }
        })
        .collect()
}

/// Compounded strategy return over the simulated rows.
pub fn cumulative_strategy_return(rows: &[PositionRow]) -> f64 {
    rows.iter()
        .filter_map(|r| r.strategy_return)
        .fold(1.0, |acc, r| acc * (1.0 + r))
        - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rows(signals: &[Signal], closes: &[f64]) -> Vec<SignalRow> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        signals
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&signal, &close))| SignalRow {
                date: start + Duration::days(i as i64),
                open: close,
                close,
                rsi: 50.0,
                short_ma: 0.0,
                long_ma: 0.0,
                signal,
            })
            .collect()
    }

    #[test]
    fn forward_fill_carries_last_non_hold() {
        use Signal::*;
        let r = rows(&[Hold, Buy, Hold, Hold, Sell, Hold], &[1.0; 6]);
        let filled = forward_fill(&r);
        assert_eq!(
            filled,
            vec![
                PositionState::NoPositionYet,
                PositionState::InPosition,
                PositionState::InPosition,
                PositionState::InPosition,
                PositionState::Flat,
                PositionState::Flat,
            ]
        );
    }

    #[test]
    fn positions_are_delayed_one_bar() {
        use Signal::*;
        let r = rows(&[Buy, Hold, Sell, Hold], &[10.0, 11.0, 12.0, 13.0]);
        let p = simulate_positions(&r);
        assert_eq!(p[0].state, PositionState::NoPositionYet);
        assert_eq!(p[1].state, PositionState::InPosition);
        assert_eq!(p[2].state, PositionState::InPosition);
        assert_eq!(p[3].state, PositionState::Flat);
    }

    #[test]
    fn first_row_is_never_in_position() {
        use Signal::*;
        for first in [Buy, Sell, Hold] {
            let p = simulate_positions(&rows(&[first, Hold], &[1.0, 2.0]));
            assert!(!p[0].state.is_in_position());
            assert_eq!(p[0].market_return, None);
            assert_eq!(p[0].strategy_return, None);
        }
    }

    #[test]
    fn strategy_returns_weighted_by_position() {
        use Signal::*;
        let r = rows(&[Buy, Hold, Sell, Hold], &[100.0, 110.0, 121.0, 60.5]);
        let p = simulate_positions(&r);
        assert!((p[1].market_return.unwrap() - 0.10).abs() < 1e-12);
        assert!((p[1].strategy_return.unwrap() - 0.10).abs() < 1e-12);
        assert!((p[2].strategy_return.unwrap() - 0.10).abs() < 1e-12);
        assert!((p[3].market_return.unwrap() + 0.5).abs() < 1e-12);
        assert_eq!(p[3].strategy_return, Some(0.0));
        assert!((cumulative_strategy_return(&p) - 0.21).abs() < 1e-9);
    }

    #[test]
    fn non_finite_previous_close_has_no_return() {
        use Signal::*;
        let r = rows(&[Buy, Hold, Hold], &[f64::INFINITY, 10.0, 11.0]);
        let p = simulate_positions(&r);
        assert_eq!(p[1].market_return, None);
        assert_eq!(p[1].strategy_return, None);
        assert!(p[2].market_return.is_some());
    }

    #[test]
    fn empty_signals_empty_positions() {
        assert!(simulate_positions(&[]).is_empty());
        assert_eq!(cumulative_strategy_return(&[]), 0.0);
    }

    #[test]
    fn weight_values() {
        assert_eq!(PositionState::InPosition.weight(), 1.0);
        assert_eq!(PositionState::Flat.weight(), 0.0);
        assert_eq!(PositionState::NoPositionYet.weight(), 0.0);
    }
}
