//! Configuration validation.
//!
//! Validates every config field before the pipeline runs. Missing keys fall
//! back to the same defaults the CLI uses when assembling the run.

use crate::domain::error::AlgoError;
use crate::ports::config_port::ConfigPort;
use std::collections::HashSet;

pub const DEFAULT_TICKERS: &str = "RELIANCE.NS,TCS.NS,INFY.NS";
pub const DATA_SOURCES: [&str; 2] = ["yahoo", "csv"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AlgoError> {
    validate_run_config(config)?;
    validate_strategy_config(config)?;
    validate_classifier_config(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> AlgoError {
    AlgoError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a comma separated ticker list. Tickers are trimmed and upper-cased;
/// blank entries and duplicates are rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, AlgoError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(invalid("run", "tickers", "empty ticker in list"));
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(invalid(
                "run",
                "tickers",
                &format!("duplicate ticker: {ticker}"),
            ));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub fn configured_tickers(config: &dyn ConfigPort) -> Result<Vec<String>, AlgoError> {
    let raw = config
        .get_string("run", "tickers")
        .unwrap_or_else(|| DEFAULT_TICKERS.to_string());
    parse_tickers(&raw)
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, AlgoError> {
    let value = config.get_int(section, key, default);
    if value <= 0 {
        return Err(invalid(section, key, &format!("{key} must be positive")));
    }
    Ok(value)
}

pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), AlgoError> {
    configured_tickers(config)?;
    positive_int(config, "run", "lookback_years", 5)?;
    positive_int(config, "run", "backtest_months", 6)?;

    if let Some(source) = config.get_string("run", "data_source") {
        if !DATA_SOURCES.contains(&source.to_lowercase().as_str()) {
            return Err(invalid(
                "run",
                "data_source",
                "data_source must be one of: yahoo, csv",
            ));
        }
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), AlgoError> {
    positive_int(config, "strategy", "rsi_period", 14)?;
    let short = positive_int(config, "strategy", "short_window", 20)?;
    let long = positive_int(config, "strategy", "long_window", 50)?;
    if short >= long {
        return Err(invalid(
            "strategy",
            "short_window",
            "short_window must be less than long_window",
        ));
    }

    let oversold = config.get_double("strategy", "oversold", 30.0);
    if !(oversold > 0.0 && oversold < 100.0) {
        return Err(invalid(
            "strategy",
            "oversold",
            "oversold must be between 0 and 100",
        ));
    }
    Ok(())
}

pub fn validate_classifier_config(config: &dyn ConfigPort) -> Result<(), AlgoError> {
    positive_int(config, "classifier", "n_trees", 100)?;
    positive_int(config, "classifier", "max_depth", 10)?;
    positive_int(config, "classifier", "min_samples_leaf", 1)?;
    if config.get_int("classifier", "min_samples_split", 2) < 2 {
        return Err(invalid(
            "classifier",
            "min_samples_split",
            "min_samples_split must be at least 2",
        ));
    }

    let fraction = config.get_double("classifier", "test_fraction", 0.2);
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(invalid(
            "classifier",
            "test_fraction",
            "test_fraction must be between 0 and 1 (exclusive)",
        ));
    }

    if !config.get_double("classifier", "up_threshold", 0.001).is_finite() {
        return Err(invalid("classifier", "up_threshold", "up_threshold must be finite"));
    }
    if config.get_int("classifier", "seed", 42) < 0 {
        return Err(invalid("classifier", "seed", "seed must be non-negative"));
    }
    Ok(())
}
