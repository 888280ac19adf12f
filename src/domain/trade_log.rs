//! Trade log extraction.
//!
//! A signal seen on bar t executes at the open of bar t+1. The scan is a fold
//! over consecutive row pairs carrying `(state, events)`: BUY while flat opens,
//! SELL while in position closes, anything else is ignored. The event list is
//! therefore alternating by construction. A signal on the final bar has no
//! execution bar and is discarded.

use crate::domain::position::PositionState;
use crate::domain::signal::{Signal, SignalRow};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub entry: TradeEvent,
    pub exit: TradeEvent,
}

impl RoundTrip {
    pub fn pnl(&self) -> f64 {
        self.exit.price - self.entry.price
    }

    pub fn is_win(&self) -> bool {
        self.exit.price > self.entry.price
    }
}

/// Completed round trips only: a trailing unmatched BUY is never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLog {
    pub events: Vec<TradeEvent>,
}

impl TradeLog {
    pub fn from_events(events: Vec<TradeEvent>) -> Self {
        Self {
            events: trim_unmatched(events),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn round_trips(&self) -> Vec<RoundTrip> {
        self.events
            .chunks_exact(2)
            .map(|pair| RoundTrip {
                entry: pair[0].clone(),
                exit: pair[1].clone(),
            })
            .collect()
    }
}

pub fn extract_trades(rows: &[SignalRow]) -> Vec<TradeEvent> {
    let (_, events) = rows.windows(2).fold(
        (PositionState::Flat, Vec::new()),
        |(state, mut events), pair| {
            let (signal_bar, fill_bar) = (&pair[0], &pair[1]);
            let next = match (signal_bar.signal, state) {
                (Signal::Buy, PositionState::Flat) => {
                    events.push(TradeEvent {
                        date: fill_bar.date,
                        side: TradeSide::Buy,
                        price: fill_bar.open,
                    });
                    PositionState::InPosition
                }
                (Signal::Sell, PositionState::InPosition) => {
                    events.push(TradeEvent {
                        date: fill_bar.date,
                        side: TradeSide::Sell,
                        price: fill_bar.open,
                    });
                    PositionState::Flat
                }
                _ => state,
            };
            (next, events)
        },
    );
    events
}

/// Drops the last event when the count is odd (an open position at the end).
pub fn trim_unmatched(mut events: Vec<TradeEvent>) -> Vec<TradeEvent> {
    if events.len() % 2 != 0 {
        events.pop();
    }
    events
}

pub fn build_trade_log(rows: &[SignalRow]) -> TradeLog {
    TradeLog::from_events(extract_trades(rows))
}
