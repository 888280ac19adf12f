//! Performance summary over a trade log.

use crate::domain::trade_log::{TradeEvent, TradeSide, trim_unmatched};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Performance {
    /// Sum of (sell - buy) over completed round trips, in price units.
    pub pnl: f64,
    /// Percentage of round trips that closed above their entry, 0-100.
    pub win_ratio: f64,
    /// Number of completed round trips.
    pub total_trades: usize,
}

impl Performance {
    pub fn zero() -> Self {
        Self {
            pnl: 0.0,
            win_ratio: 0.0,
            total_trades: 0,
        }
    }

    /// Pairs the i-th BUY with the i-th SELL. An odd trailing event is
    /// trimmed first; a log with no BUYs or no SELLs summarizes to zero.
    pub fn summarize(events: &[TradeEvent]) -> Self {
        let events = trim_unmatched(events.to_vec());

        let buys = events.iter().filter(|e| e.side == TradeSide::Buy);
        let sells = events.iter().filter(|e| e.side == TradeSide::Sell);

        let (pnl, wins, total_trades) = buys
            .zip(sells)
            .fold((0.0, 0usize, 0usize), |(pnl, wins, n), (buy, sell)| {
                let win = usize::from(sell.price > buy.price);
                (pnl + (sell.price - buy.price), wins + win, n + 1)
            });

        if total_trades == 0 {
            return Self::zero();
        }

        Self {
            pnl,
            win_ratio: 100.0 * wins as f64 / total_trades as f64,
            total_trades,
        }
    }
}
