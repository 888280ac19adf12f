//! Tabular publishing model.
//!
//! Every worksheet is an ordered list of named columns and rows of cells.
//! Missing numbers (undefined or NaN) render as empty strings.

use crate::domain::performance::Performance;
use crate::domain::trade_log::TradeEvent;
use chrono::NaiveDate;

pub const TRADE_LOG_SHEET: &str = "Trade Log";
pub const SUMMARY_SHEET: &str = "Summary P&L";

pub const TRADE_LOG_COLUMNS: [&str; 4] = ["date", "type", "price", "ticker"];
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "Ticker",
    "P&L",
    "Win Ratio (%)",
    "Total Trades",
    "ML Model Accuracy",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) if v.is_finite() => v.to_string(),
            Cell::Number(_) => String::new(),
            Cell::Integer(v) => v.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn from_option(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows shorter than the header are padded with empty cells.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Header followed by every row, rendered to strings.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.columns.clone())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.iter().map(Cell::render).collect()),
            )
            .collect()
    }
}

/// A trade event tagged with the ticker it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerTrade {
    pub ticker: String,
    pub event: TradeEvent,
}

/// One line of the per-ticker summary sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub ticker: String,
    /// None when the backtest window was insufficient.
    pub performance: Option<Performance>,
    /// None when the classifier had insufficient data.
    pub accuracy: Option<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn trade_log_table(trades: &[TickerTrade]) -> Table {
    let mut table = Table::new(&TRADE_LOG_COLUMNS);
    for t in trades {
        table.push_row(vec![
            Cell::Date(t.event.date),
            Cell::Text(t.event.side.to_string()),
            Cell::Number(t.event.price),
            Cell::Text(t.ticker.clone()),
        ]);
    }
    table
}

pub fn summary_table(rows: &[SummaryRow]) -> Table {
    let mut table = Table::new(&SUMMARY_COLUMNS);
    for row in rows {
        let (pnl, win_ratio, trades) = match &row.performance {
            Some(p) => (
                Cell::Number(round2(p.pnl)),
                Cell::Number(round2(p.win_ratio)),
                Cell::Integer(p.total_trades as i64),
            ),
            None => (Cell::Empty, Cell::Empty, Cell::Empty),
        };
        let accuracy = match row.accuracy {
            Some(a) => Cell::Number((a * 10_000.0).round() / 10_000.0),
            None => Cell::Text("N/A".into()),
        };
        table.push_row(vec![Cell::Text(row.ticker.clone()), pnl, win_ratio, trades, accuracy]);
    }
    table
}
