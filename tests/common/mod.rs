#![allow(dead_code)]

use algotrader::cli::AppConfig;
use algotrader::domain::classifier::ClassifierConfig;
use algotrader::domain::classifier::random_forest::ForestConfig;
use algotrader::domain::error::AlgoError;
use algotrader::domain::features::FeatureTable;
pub use algotrader::domain::ohlcv::OhlcvBar;
use algotrader::domain::table::Table;
use algotrader::ports::alert_port::AlertPort;
use algotrader::ports::classifier_port::ClassifierPort;
use algotrader::ports::data_port::PriceDataPort;
use algotrader::ports::sheet_port::SheetPort;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgoError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AlgoError::DataSource {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Records every alert; optionally fails each send after recording it.
#[derive(Default)]
pub struct RecordingAlerts {
    pub messages: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingAlerts {
    pub fn failing() -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl AlertPort for RecordingAlerts {
    fn send(&self, message: &str) -> Result<(), AlgoError> {
        self.messages.borrow_mut().push(message.to_string());
        if self.fail {
            return Err(AlgoError::Alert {
                reason: "channel down".into(),
            });
        }
        Ok(())
    }
}

/// Keeps the latest table per worksheet, like a replacing publisher would.
#[derive(Default)]
pub struct RecordingSheets {
    pub writes: RefCell<Vec<(String, Table)>>,
    pub fail_on: Option<String>,
}

impl RecordingSheets {
    pub fn failing_on(worksheet: &str) -> Self {
        Self {
            writes: RefCell::new(Vec::new()),
            fail_on: Some(worksheet.to_string()),
        }
    }

    pub fn worksheet_names(&self) -> Vec<String> {
        self.writes.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn table(&self, worksheet: &str) -> Option<Table> {
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(n, _)| n == worksheet)
            .map(|(_, t)| t.clone())
    }
}

impl SheetPort for RecordingSheets {
    fn write_table(&self, worksheet: &str, table: &Table) -> Result<(), AlgoError> {
        if self.fail_on.as_deref() == Some(worksheet) {
            return Err(AlgoError::Publish {
                worksheet: worksheet.to_string(),
                reason: "quota exceeded".into(),
            });
        }
        self.writes
            .borrow_mut()
            .push((worksheet.to_string(), table.clone()));
        Ok(())
    }
}

/// Returns a fixed accuracy, or insufficient data for an empty table.
pub struct FixedClassifier(pub f64);

impl ClassifierPort for FixedClassifier {
    fn train_and_score(&self, table: &FeatureTable) -> Result<f64, AlgoError> {
        if table.is_empty() {
            return Err(AlgoError::InsufficientTrainingData {
                reason: "empty table".into(),
            });
        }
        Ok(self.0)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day starting at `start`, open = high = low = close.
pub fn make_bars_from(start: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000 + (i as u64 % 7) * 100,
        })
        .collect()
}

pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    make_bars_from(date(2024, 1, 1), closes)
}

/// Steady rise, a single sharp dip and immediate rebound, a short rise and
/// then a long decline. With the default strategy this yields one BUY on
/// the bar after the dip and one SELL once the short MA crosses under.
pub fn dip_then_decline(len: usize) -> Vec<f64> {
    (0..len)
        .scan(100.0, |price, i| {
            *price += match i {
                0 => 0.0,
                1..=99 => 1.0,
                100 => -35.0,
                101 => 40.0,
                102..=130 => 1.0,
                _ => -2.0,
            };
            Some(*price)
        })
        .collect()
}

/// `history` days of gentle oscillation followed by `window` on the days up
/// to and including `as_of`.
pub fn series_ending(as_of: NaiveDate, history: usize, window: &[f64]) -> Vec<OhlcvBar> {
    let warmup: Vec<f64> = (0..history)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0)
        .collect();
    let closes: Vec<f64> = warmup.iter().chain(window).copied().collect();
    let start = as_of - chrono::Duration::days(closes.len() as i64 - 1);
    make_bars_from(start, &closes)
}

pub fn test_app_config(tickers: &[&str]) -> AppConfig {
    AppConfig {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        classifier: ClassifierConfig {
            forest: ForestConfig {
                n_trees: 10,
                ..ForestConfig::default()
            },
            test_fraction: 0.2,
        },
        ..AppConfig::default()
    }
}
