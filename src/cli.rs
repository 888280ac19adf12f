//! CLI definition, run configuration and the per-ticker pipeline.

use chrono::{Months, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_sheet_adapter::CsvSheetAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::gsheets_adapter::GoogleSheetsAdapter;
use crate::adapters::telegram_adapter::{TelegramAdapter, TelegramConfig};
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::backtest::{BacktestConfig, run_backtest};
use crate::domain::classifier::random_forest::ForestConfig;
use crate::domain::classifier::{ClassifierConfig, RandomForestClassifier};
use crate::domain::config_validation::{configured_tickers, validate_config};
use crate::domain::error::AlgoError;
use crate::domain::features::{DEFAULT_UP_THRESHOLD, build_feature_table};
use crate::domain::ohlcv::validate_series;
use crate::domain::signal::StrategyParams;
use crate::domain::table::{
    SUMMARY_SHEET, SummaryRow, TRADE_LOG_SHEET, TickerTrade, summary_table, trade_log_table,
};
use crate::domain::trade_log::TradeEvent;
use crate::ports::alert_port::AlertPort;
use crate::ports::classifier_port::ClassifierPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::sheet_port::SheetPort;

#[derive(Parser, Debug)]
#[command(
    name = "algotrader",
    about = "Backtest an RSI + moving-average strategy and publish the results"
)]
pub struct Cli {
    /// INI configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PublishTarget {
    GoogleSheets {
        spreadsheet_id: String,
        access_token: String,
    },
    CsvDir(PathBuf),
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub lookback_years: u32,
    pub backtest: BacktestConfig,
    pub classifier: ClassifierConfig,
    pub up_threshold: f64,
    pub data_source: DataSourceKind,
    pub data_dir: PathBuf,
    pub publish: PublishTarget,
    pub telegram: Option<TelegramConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tickers: vec!["RELIANCE.NS".into(), "TCS.NS".into(), "INFY.NS".into()],
            lookback_years: 5,
            backtest: BacktestConfig::default(),
            classifier: ClassifierConfig::default(),
            up_threshold: DEFAULT_UP_THRESHOLD,
            data_source: DataSourceKind::Yahoo,
            data_dir: PathBuf::from("data"),
            publish: PublishTarget::Disabled,
            telegram: None,
        }
    }
}

impl AppConfig {
    /// First day of the price history requested for a run ending at `as_of`.
    pub fn fetch_start(&self, as_of: NaiveDate) -> NaiveDate {
        as_of
            .checked_sub_months(Months::new(self.lookback_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN)
    }
}

pub fn run(cli: Cli) -> ExitCode {
    // Stage 1: Load config
    let adapter = match cli.config.as_ref() {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            }
        }
        None => FileConfigAdapter::empty(),
    };

    // Stage 2: Validate and assemble
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    let app = match validate_config(&adapter).and_then(|()| build_app_config(&adapter, &env)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return (&e).into();
        }
    };

    // Stage 3: Wire collaborators and run
    match run_with_config(&app, chrono::Local::now().date_naive()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        log::error!("{err}");
        ExitCode::from(&err)
    })
}

fn read_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

fn read_u32(config: &dyn ConfigPort, section: &str, key: &str, default: u32) -> u32 {
    u32::try_from(config.get_int(section, key, i64::from(default))).unwrap_or(default)
}

/// Assemble the run configuration from a validated config source plus
/// environment overrides for secrets.
pub fn build_app_config(
    config: &dyn ConfigPort,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<AppConfig, AlgoError> {
    let defaults = AppConfig::default();

    let strategy_defaults = StrategyParams::default();
    let strategy = StrategyParams {
        rsi_period: read_usize(config, "strategy", "rsi_period", strategy_defaults.rsi_period),
        short_window: read_usize(
            config,
            "strategy",
            "short_window",
            strategy_defaults.short_window,
        ),
        long_window: read_usize(config, "strategy", "long_window", strategy_defaults.long_window),
        oversold: config.get_double("strategy", "oversold", strategy_defaults.oversold),
    };
    let backtest = BacktestConfig {
        backtest_months: read_u32(
            config,
            "run",
            "backtest_months",
            defaults.backtest.backtest_months,
        ),
        strategy,
    };

    let forest_defaults = ForestConfig::default();
    let classifier = ClassifierConfig {
        forest: ForestConfig {
            n_trees: read_usize(config, "classifier", "n_trees", forest_defaults.n_trees),
            max_depth: read_usize(config, "classifier", "max_depth", forest_defaults.max_depth),
            min_samples_split: read_usize(
                config,
                "classifier",
                "min_samples_split",
                forest_defaults.min_samples_split,
            ),
            min_samples_leaf: read_usize(
                config,
                "classifier",
                "min_samples_leaf",
                forest_defaults.min_samples_leaf,
            ),
            seed: u64::try_from(config.get_int("classifier", "seed", 42)).unwrap_or(42),
            ..forest_defaults
        },
        test_fraction: config.get_double(
            "classifier",
            "test_fraction",
            defaults.classifier.test_fraction,
        ),
    };

    let data_source = match config.get_string("run", "data_source") {
        Some(s) if s.eq_ignore_ascii_case("csv") => DataSourceKind::Csv,
        _ => DataSourceKind::Yahoo,
    };

    Ok(AppConfig {
        tickers: configured_tickers(config)?,
        lookback_years: read_u32(config, "run", "lookback_years", defaults.lookback_years),
        backtest,
        classifier,
        up_threshold: config.get_double("classifier", "up_threshold", defaults.up_threshold),
        data_source,
        data_dir: config
            .get_string("run", "data_dir")
            .map_or(defaults.data_dir, PathBuf::from),
        publish: resolve_publish_target(config, env),
        telegram: resolve_telegram(config, env),
    })
}

fn resolve_publish_target(
    config: &dyn ConfigPort,
    env: &dyn Fn(&str) -> Option<String>,
) -> PublishTarget {
    let spreadsheet_id =
        env("GSHEETS_SPREADSHEET_ID").or_else(|| config.get_string("sheets", "spreadsheet_id"));
    let access_token =
        env("GSHEETS_ACCESS_TOKEN").or_else(|| config.get_string("sheets", "access_token"));
    match (spreadsheet_id, access_token) {
        (Some(spreadsheet_id), Some(access_token)) => {
            return PublishTarget::GoogleSheets {
                spreadsheet_id,
                access_token,
            };
        }
        (Some(_), None) => {
            log::warn!("spreadsheet id set without an access token; Google Sheets disabled");
        }
        _ => {}
    }

    config
        .get_string("sheets", "output_dir")
        .map_or(PublishTarget::Disabled, |dir| {
            PublishTarget::CsvDir(PathBuf::from(dir))
        })
}

fn resolve_telegram(
    config: &dyn ConfigPort,
    env: &dyn Fn(&str) -> Option<String>,
) -> Option<TelegramConfig> {
    let bot_token =
        env("TELEGRAM_BOT_TOKEN").or_else(|| config.get_string("telegram", "bot_token"));
    let chat_id = env("TELEGRAM_CHAT_ID").or_else(|| config.get_string("telegram", "chat_id"));
    match (bot_token, chat_id) {
        (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
        _ => None,
    }
}

fn run_with_config(app: &AppConfig, as_of: NaiveDate) -> Result<(), AlgoError> {
    let data: Box<dyn PriceDataPort> = match app.data_source {
        DataSourceKind::Yahoo => Box::new(YahooAdapter::new()?),
        DataSourceKind::Csv => Box::new(CsvAdapter::new(app.data_dir.clone())),
    };
    let alerts = TelegramAdapter::new(app.telegram.clone())?;
    if !alerts.is_configured() {
        log::info!("Telegram bot token or chat ID not set. Alerts are disabled.");
    }
    let classifier = RandomForestClassifier::new(app.classifier.clone());

    let sheets: Option<Box<dyn SheetPort>> = match &app.publish {
        PublishTarget::GoogleSheets {
            spreadsheet_id,
            access_token,
        } => Some(Box::new(GoogleSheetsAdapter::new(spreadsheet_id, access_token)?)),
        PublishTarget::CsvDir(dir) => Some(Box::new(CsvSheetAdapter::new(dir.clone()))),
        PublishTarget::Disabled => {
            log::warn!("No spreadsheet or output directory configured. Skipping publishing.");
            None
        }
    };

    log::info!("Tickers being used: {}", app.tickers.join(", "));
    let collaborators = Collaborators {
        data: data.as_ref(),
        classifier: &classifier,
        alerts: &alerts,
    };
    let report = run_pipeline(&collaborators, app, as_of);

    if let Some(sheets) = sheets.as_deref() {
        publish_report(&report, sheets);
    }
    log::info!("Algo-trading process finished.");
    Ok(())
}

/// The collaborators one pipeline run talks to.
pub struct Collaborators<'a> {
    pub data: &'a dyn PriceDataPort,
    pub classifier: &'a dyn ClassifierPort,
    pub alerts: &'a dyn AlertPort,
}

/// What a single ticker contributed to the run.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    /// Nothing fetched or the series was unusable; no rows are emitted.
    Skipped,
    Processed {
        trades: Vec<TradeEvent>,
        summary: SummaryRow,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub trades: Vec<TickerTrade>,
    pub summaries: Vec<SummaryRow>,
    pub skipped: Vec<String>,
}

pub fn trade_message(ticker: &str, event: &TradeEvent) -> String {
    format!(
        "*{}* signal for *{}* at {}, price: {:.2}",
        event.side,
        ticker,
        event.date.format("%Y-%m-%d"),
        event.price
    )
}

pub fn no_data_message(ticker: &str) -> String {
    format!("❗️ *Error*: No data fetched for {ticker}. Skipping.")
}

pub fn insufficient_window_message(ticker: &str, months: u32) -> String {
    format!("❗️ *Error*: Not enough data for the last {months} months for {ticker}. Skipping backtest.")
}

fn notify(alerts: &dyn AlertPort, message: &str) {
    if let Err(e) = alerts.send(message) {
        log::warn!("Failed to send alert: {e}");
    }
}

pub fn process_ticker(
    ticker: &str,
    collaborators: &Collaborators<'_>,
    app: &AppConfig,
    as_of: NaiveDate,
) -> TickerOutcome {
    log::info!("Processing ticker: {ticker}");

    // 1. Data
    let bars = match collaborators.data.fetch_daily(ticker, app.fetch_start(as_of), as_of) {
        Ok(bars) if !bars.is_empty() => bars,
        Ok(_) => {
            log::warn!("No data fetched for {ticker}. Skipping.");
            notify(collaborators.alerts, &no_data_message(ticker));
            return TickerOutcome::Skipped;
        }
        Err(e) => {
            log::warn!("No data fetched for {ticker} ({e}). Skipping.");
            notify(collaborators.alerts, &no_data_message(ticker));
            return TickerOutcome::Skipped;
        }
    };
    if let Err(e) = validate_series(ticker, &bars) {
        log::warn!("{e}. Skipping.");
        notify(collaborators.alerts, &format!("❗️ *Error*: {e}. Skipping."));
        return TickerOutcome::Skipped;
    }

    // 2. Backtest over the trailing window
    let (trades, performance) = match app.backtest.select_window(ticker, &bars, as_of) {
        Ok(window) => {
            let result = run_backtest(window, &app.backtest.strategy);
            let performance = result.performance;
            log::info!(
                "Backtesting complete for {ticker}. P&L: {:.2}, Win Ratio: {:.2}%",
                performance.pnl,
                performance.win_ratio
            );
            for event in &result.trade_log.events {
                notify(collaborators.alerts, &trade_message(ticker, event));
            }
            (result.trade_log.events, Some(performance))
        }
        Err(e) => {
            log::warn!(
                "Not enough data for the last {} months for {ticker} ({e}). Skipping backtest.",
                app.backtest.backtest_months
            );
            notify(
                collaborators.alerts,
                &insufficient_window_message(ticker, app.backtest.backtest_months),
            );
            (Vec::new(), None)
        }
    };

    // 3. Classifier over the full history
    let table = build_feature_table(&bars, app.up_threshold);
    let accuracy = match collaborators.classifier.train_and_score(&table) {
        Ok(accuracy) => {
            log::info!("ML model accuracy for {ticker}: {accuracy:.2}");
            Some(accuracy)
        }
        Err(e) => {
            log::warn!("ML model skipped for {ticker}: {e}");
            None
        }
    };

    TickerOutcome::Processed {
        trades,
        summary: SummaryRow {
            ticker: ticker.to_string(),
            performance,
            accuracy,
        },
    }
}

/// Runs every configured ticker in order. A ticker's failure never stops the run.
pub fn run_pipeline(
    collaborators: &Collaborators<'_>,
    app: &AppConfig,
    as_of: NaiveDate,
) -> RunReport {
    log::info!("Starting the algo-trading process...");
    app.tickers
        .iter()
        .fold(RunReport::default(), |mut report, ticker| {
            match process_ticker(ticker, collaborators, app, as_of) {
                TickerOutcome::Skipped => report.skipped.push(ticker.clone()),
                TickerOutcome::Processed { trades, summary } => {
                    report.trades.extend(trades.into_iter().map(|event| TickerTrade {
                        ticker: ticker.clone(),
                        event,
                    }));
                    report.summaries.push(summary);
                }
            }
            report
        })
}

/// Writes the trade log and summary sheets. Failures are logged per sheet.
pub fn publish_report(report: &RunReport, sheets: &dyn SheetPort) {
    if report.trades.is_empty() {
        log::info!("No trades to log.");
    } else {
        log::info!("Writing full trade log to '{TRADE_LOG_SHEET}'...");
        if let Err(e) = sheets.write_table(TRADE_LOG_SHEET, &trade_log_table(&report.trades)) {
            log::error!("{e}");
        }
    }

    if !report.summaries.is_empty() {
        log::info!("Writing summary P&L to '{SUMMARY_SHEET}'...");
        if let Err(e) = sheets.write_table(SUMMARY_SHEET, &summary_table(&report.summaries)) {
            log::error!("{e}");
        }
    }
}
