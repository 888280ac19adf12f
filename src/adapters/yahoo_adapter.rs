//! Yahoo Finance price adapter (v8 chart API, daily bars).
//!
//! Prices are auto-adjusted: when the response carries an adjusted close,
//! open/high/low/close are scaled by `adjclose / close` for that bar.

use crate::domain::error::AlgoError;
use crate::domain::ohlcv::{OhlcvBar, normalize_series};
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, AlgoError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AlgoError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        format!(
            "{}/{ticker}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }
}

fn data_error(ticker: &str, reason: impl Into<String>) -> AlgoError {
    AlgoError::DataSource {
        ticker: ticker.to_string(),
        reason: reason.into(),
    }
}

/// Convert a chart response into adjusted bars. A response with no rows
/// yields an empty vector rather than an error.
fn parse_chart(ticker: &str, resp: ChartResponse) -> Result<Vec<OhlcvBar>, AlgoError> {
    let Some(result) = resp.chart.result else {
        return match resp.chart.error {
            Some(err) if err.code == "Not Found" => Ok(Vec::new()),
            Some(err) => Err(data_error(ticker, format!("{}: {}", err.code, err.description))),
            None => Ok(Vec::new()),
        };
    };

    let Some(data) = result.into_iter().next() else {
        return Ok(Vec::new());
    };
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| data_error(ticker, "no quote data"))?;
    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| data_error(ticker, format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();
        // Bars without a close cannot be priced.
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };

        let factor = adj_closes
            .as_ref()
            .and_then(|v| v.get(i).copied().flatten())
            .filter(|adj| close != 0.0 && adj.is_finite())
            .map_or(1.0, |adj| adj / close);

        bars.push(OhlcvBar {
            date,
            open: open.unwrap_or(close) * factor,
            high: high.unwrap_or(close) * factor,
            low: low.unwrap_or(close) * factor,
            close: close * factor,
            volume: volume.unwrap_or(0),
        });
    }

    Ok(normalize_series(bars))
}

impl PriceDataPort for YahooAdapter {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, AlgoError> {
        let url = self.chart_url(ticker, start, end);
        log::debug!("GET {url}");

        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(data_error(ticker, format!("HTTP {status}")));
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| data_error(ticker, format!("failed to parse response: {e}")))?;

        let bars = parse_chart(ticker, chart)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }
}
