//! Price data port trait.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Daily bars for `ticker` with `start <= date <= end`, ascending.
    ///
    /// An empty vector means the source has no data for the ticker; callers
    /// treat it the same as an error and skip the ticker.
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgoError>;
}
