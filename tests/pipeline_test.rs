//! Pipeline integration tests with mock collaborators.
//!
//! Tests cover:
//! - Per-ticker outcomes: processed, no data, source error, insufficient window
//! - Alerts emitted per trade and per skipped ticker
//! - Publishing: which worksheets are written and what they contain
//! - Collaborator failures never stop the run

mod common;

use algotrader::cli::{self, Collaborators, RunReport, TickerOutcome};
use algotrader::domain::backtest::BacktestConfig;
use algotrader::domain::classifier::RandomForestClassifier;
use algotrader::domain::table::{SUMMARY_SHEET, TRADE_LOG_SHEET};
use algotrader::domain::trade_log::TradeSide;
use chrono::NaiveDate;
use common::*;

fn as_of() -> NaiveDate {
    date(2024, 6, 30)
}

/// Number of calendar-day bars inside the default trailing window.
fn window_len() -> usize {
    let start = BacktestConfig::default().window_start(as_of());
    ((as_of() - start).num_days() + 1) as usize
}

fn round_trip_bars() -> Vec<OhlcvBar> {
    series_ending(as_of(), 200, &dip_then_decline(window_len()))
}

fn window_date(idx: usize) -> NaiveDate {
    as_of() - chrono::Duration::days((window_len() - 1 - idx) as i64)
}

fn full_port() -> MockDataPort {
    MockDataPort::new()
        .with_bars("TCS.NS", round_trip_bars())
        .with_bars("SHORT.NS", series_ending(as_of(), 0, &[100.0; 30]))
        .with_error("ERR.NS", "connection reset")
}

fn run(port: &MockDataPort, alerts: &RecordingAlerts, tickers: &[&str]) -> RunReport {
    let classifier = FixedClassifier(0.6);
    let collaborators = Collaborators {
        data: port,
        classifier: &classifier,
        alerts,
    };
    cli::run_pipeline(&collaborators, &test_app_config(tickers), as_of())
}

mod per_ticker_outcomes {
    use super::*;

    #[test]
    fn processed_ticker_yields_one_round_trip() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["TCS.NS"]);

        assert!(report.skipped.is_empty());
        assert_eq!(report.trades.len(), 2);
        assert!(report.trades.iter().all(|t| t.ticker == "TCS.NS"));

        let buy = &report.trades[0].event;
        assert_eq!(buy.side, TradeSide::Buy);
        assert_eq!(buy.date, window_date(101));
        assert_eq!(buy.price, 204.0);
        assert_eq!(report.trades[1].event.side, TradeSide::Sell);

        let summary = &report.summaries[0];
        let perf = summary.performance.unwrap();
        assert_eq!(perf.total_trades, 1);
        assert_eq!(perf.pnl, report.trades[1].event.price - 204.0);
        assert_eq!(summary.accuracy, Some(0.6));
    }

    #[test]
    fn no_data_and_errors_are_skipped() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["NODATA.NS", "ERR.NS"]);

        assert_eq!(report.skipped, vec!["NODATA.NS", "ERR.NS"]);
        assert!(report.summaries.is_empty());
        assert!(report.trades.is_empty());
        assert_eq!(
            alerts.messages(),
            vec![
                "❗️ *Error*: No data fetched for NODATA.NS. Skipping.",
                "❗️ *Error*: No data fetched for ERR.NS. Skipping.",
            ]
        );
    }

    #[test]
    fn insufficient_window_still_emits_summary_row() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["SHORT.NS"]);

        assert!(report.skipped.is_empty());
        assert!(report.trades.is_empty());
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].ticker, "SHORT.NS");
        assert_eq!(report.summaries[0].performance, None);
        // 30 bars cannot define EMA(50), so the classifier sees no rows.
        assert_eq!(report.summaries[0].accuracy, None);
        assert_eq!(
            alerts.messages(),
            vec!["❗️ *Error*: Not enough data for the last 6 months for SHORT.NS. Skipping backtest."]
        );
    }

    #[test]
    fn tickers_are_reported_in_configured_order() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["SHORT.NS", "NODATA.NS", "TCS.NS"]);

        let tickers: Vec<&str> = report.summaries.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["SHORT.NS", "TCS.NS"]);
        assert_eq!(report.skipped, vec!["NODATA.NS"]);
    }

    #[test]
    fn process_ticker_reports_skip() {
        let port = MockDataPort::new();
        let alerts = RecordingAlerts::default();
        let classifier = FixedClassifier(0.5);
        let collaborators = Collaborators {
            data: &port,
            classifier: &classifier,
            alerts: &alerts,
        };
        let outcome =
            cli::process_ticker("NONE.NS", &collaborators, &test_app_config(&[]), as_of());
        assert_eq!(outcome, TickerOutcome::Skipped);
    }

    #[test]
    fn random_forest_accuracy_is_a_fraction() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let classifier = RandomForestClassifier::new(test_app_config(&[]).classifier);
        let collaborators = Collaborators {
            data: &port,
            classifier: &classifier,
            alerts: &alerts,
        };
        let report = cli::run_pipeline(&collaborators, &test_app_config(&["TCS.NS"]), as_of());

        let accuracy = report.summaries[0].accuracy.unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }
}

mod alerts {
    use super::*;

    #[test]
    fn one_alert_per_trade_event() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["TCS.NS"]);

        let messages = alerts.messages();
        assert_eq!(messages.len(), report.trades.len());
        assert_eq!(
            messages[0],
            format!(
                "*BUY* signal for *TCS.NS* at {}, price: 204.00",
                window_date(101).format("%Y-%m-%d")
            )
        );
        assert!(messages[1].starts_with("*SELL* signal for *TCS.NS* at "));
    }

    #[test]
    fn failing_alert_channel_does_not_stop_the_run() {
        let port = full_port();
        let alerts = RecordingAlerts::failing();
        let report = run(&port, &alerts, &["NODATA.NS", "TCS.NS", "SHORT.NS"]);

        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.trades.len(), 2);
        assert_eq!(alerts.messages().len(), 4);
    }
}

mod publishing {
    use super::*;

    #[test]
    fn writes_trade_log_and_summary() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["TCS.NS", "SHORT.NS"]);

        let sheets = RecordingSheets::default();
        cli::publish_report(&report, &sheets);

        assert_eq!(sheets.worksheet_names(), vec![TRADE_LOG_SHEET, SUMMARY_SHEET]);

        let trade_log = sheets.table(TRADE_LOG_SHEET).unwrap().to_string_rows();
        assert_eq!(trade_log[0], vec!["date", "type", "price", "ticker"]);
        assert_eq!(trade_log.len(), 3);
        assert_eq!(trade_log[1][1], "BUY");
        assert_eq!(trade_log[1][2], "204");
        assert_eq!(trade_log[1][3], "TCS.NS");

        let summary = sheets.table(SUMMARY_SHEET).unwrap().to_string_rows();
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1][0], "TCS.NS");
        assert_eq!(summary[1][3], "1");
        assert_eq!(summary[1][4], "0.6");
        assert_eq!(summary[2], vec!["SHORT.NS", "", "", "", "N/A"]);
    }

    #[test]
    fn no_trades_writes_only_summary() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["SHORT.NS"]);

        let sheets = RecordingSheets::default();
        cli::publish_report(&report, &sheets);
        assert_eq!(sheets.worksheet_names(), vec![SUMMARY_SHEET]);
    }

    #[test]
    fn empty_report_writes_nothing() {
        let sheets = RecordingSheets::default();
        cli::publish_report(&RunReport::default(), &sheets);
        assert!(sheets.worksheet_names().is_empty());
    }

    #[test]
    fn failed_trade_log_write_still_writes_summary() {
        let port = full_port();
        let alerts = RecordingAlerts::default();
        let report = run(&port, &alerts, &["TCS.NS"]);

        let sheets = RecordingSheets::failing_on(TRADE_LOG_SHEET);
        cli::publish_report(&report, &sheets);
        assert_eq!(sheets.worksheet_names(), vec![SUMMARY_SHEET]);
    }
}
