//! Spreadsheet publisher port trait.

use crate::domain::error::AlgoError;
use crate::domain::table::Table;

pub trait SheetPort {
    /// Write `table` to `worksheet`, replacing any worksheet of that name.
    fn write_table(&self, worksheet: &str, table: &Table) -> Result<(), AlgoError>;
}
