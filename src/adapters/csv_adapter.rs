//! CSV file price adapter for offline runs.
//!
//! Reads `<base_path>/<TICKER>.csv` with header `date,open,high,low,close,volume`.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::{OhlcvBar, normalize_series};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }
}

impl PriceDataPort for CsvAdapter {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgoError> {
        let path = self.csv_path(ticker);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no price file at {}", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for (line, result) in rdr.deserialize::<OhlcvBar>().enumerate() {
            let bar = result.map_err(|e| AlgoError::DataSource {
                ticker: ticker.to_string(),
                reason: format!("{} row {}: {}", path.display(), line + 1, e),
            })?;
            if bar.date >= start && bar.date <= end {
                bars.push(bar);
            }
        }

        Ok(normalize_series(bars))
    }
}
