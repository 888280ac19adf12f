//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_sheet_adapter;
pub mod file_config_adapter;
pub mod gsheets_adapter;
pub mod telegram_adapter;
pub mod yahoo_adapter;
