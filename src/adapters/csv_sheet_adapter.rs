//! Directory-of-CSV-files publisher.
//!
//! Each worksheet becomes `<output_dir>/<worksheet>.csv`; writing a worksheet
//! again overwrites the previous file.

use crate::domain::error::AlgoError;
use crate::domain::table::Table;
use crate::ports::sheet_port::SheetPort;
use std::fs;
use std::path::PathBuf;

pub struct CsvSheetAdapter {
    output_dir: PathBuf,
}

impl CsvSheetAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn sheet_path(&self, worksheet: &str) -> PathBuf {
        self.output_dir.join(format!("{worksheet}.csv"))
    }
}

impl SheetPort for CsvSheetAdapter {
    fn write_table(&self, worksheet: &str, table: &Table) -> Result<(), AlgoError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.sheet_path(worksheet);

        let mut wtr = csv::Writer::from_path(&path)?;
        for row in table.to_string_rows() {
            wtr.write_record(&row)?;
        }
        wtr.flush()?;

        log::info!("wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }
}
