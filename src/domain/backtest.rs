//! Backtest pipeline: indicators → signals → positions → trade log → performance.
//!
//! BacktestConfig defines the trailing window and strategy parameters.

use crate::domain::error::AlgoError;
use crate::domain::indicator::{IndicatorSet, compute_indicators};
use crate::domain::ohlcv::{OhlcvBar, trailing_window};
use crate::domain::performance::Performance;
use crate::domain::position::{PositionRow, simulate_positions};
use crate::domain::signal::{SignalRow, StrategyParams, generate_signals, signal_counts};
use crate::domain::trade_log::{TradeLog, build_trade_log};
use chrono::{Months, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Length of the trailing window, in calendar months, ending at the run date.
    pub backtest_months: u32,
    pub strategy: StrategyParams,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            backtest_months: 6,
            strategy: StrategyParams::default(),
        }
    }
}

impl BacktestConfig {
    pub fn window_start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of
            .checked_sub_months(Months::new(self.backtest_months))
            .unwrap_or(NaiveDate::MIN)
    }

    /// The trailing slice of `bars` to backtest, or `InsufficientWindow` when
    /// it cannot produce a single defined signal row.
    pub fn select_window<'a>(
        &self,
        ticker: &str,
        bars: &'a [OhlcvBar],
        as_of: NaiveDate,
    ) -> Result<&'a [OhlcvBar], AlgoError> {
        let window = trailing_window(bars, self.window_start(as_of));
        let minimum = self.strategy.min_bars().max(1);
        if window.len() < minimum {
            return Err(AlgoError::InsufficientWindow {
                ticker: ticker.to_string(),
                bars: window.len(),
                minimum,
            });
        }
        Ok(window)
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub indicators: IndicatorSet,
    pub signals: Vec<SignalRow>,
    pub positions: Vec<PositionRow>,
    pub trade_log: TradeLog,
    pub performance: Performance,
}

pub fn run_backtest(bars: &[OhlcvBar], params: &StrategyParams) -> BacktestResult {
    let indicators = compute_indicators(bars, &params.indicator_types());
    let signals = generate_signals(bars, &indicators, params);

    let (buys, sells, _) = signal_counts(&signals);
    log::debug!(
        "{} bars, {} signal rows, {} buy / {} sell signals",
        bars.len(),
        signals.len(),
        buys,
        sells
    );

    let positions = simulate_positions(&signals);
    let trade_log = build_trade_log(&signals);
    let performance = Performance::summarize(&trade_log.events);

    BacktestResult {
        indicators,
        signals,
        positions,
        trade_log,
        performance,
    }
}
