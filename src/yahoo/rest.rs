use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};

use crate::error::AppError;
use crate::http::compact_error_body;
use crate::model::bar::{Bar, BarInterval, BarSeries};
use crate::source::{check_range, BarSource};

use super::types::ChartResponse;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Blocking client for Yahoo's v8 chart endpoint.
pub struct YahooChartClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl YahooChartClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .context("failed to build Yahoo HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    fn epoch_secs(date: NaiveDate) -> i64 {
        date.and_time(chrono::NaiveTime::default()).and_utc().timestamp()
    }
}

/// Turn a chart payload into bars.
///
/// Rows missing any price field are skipped, as are rows whose timestamp does
/// not advance past the previous kept row.
pub(crate) fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, AppError> {
    let Some(results) = resp.chart.result else {
        let cause = match resp.chart.error {
            Some(err) => format!("{}: {}", err.code, err.description),
            None => "empty result with no error".to_string(),
        };
        return Err(AppError::data_unavailable(symbol, cause));
    };

    let data = results
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_unavailable(symbol, "result array is empty"))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::data_unavailable(symbol, "no quote data"))?;

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(ts, 0).ok_or_else(|| {
            AppError::data_unavailable(symbol, format!("invalid timestamp: {}", ts))
        })?;
        if bars.last().is_some_and(|b| b.timestamp >= timestamp) {
            tracing::debug!(symbol, ts, "Dropping out-of-order bar");
            continue;
        }
        let volume = field(&quote.volume).unwrap_or(0.0).max(0.0) as u64;
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if bars.is_empty() {
        return Err(AppError::data_unavailable(symbol, "no bars in requested range"));
    }
    Ok(bars)
}

impl BarSource for YahooChartClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: BarInterval,
    ) -> Result<BarSeries, AppError> {
        check_range(symbol, start, end)?;

        let url = self.chart_url(symbol);
        let period1 = Self::epoch_secs(start).to_string();
        let period2 = Self::epoch_secs(end).to_string();
        tracing::debug!(symbol, %start, %end, %interval, "Fetching chart bars");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", interval.as_provider_str()),
                ("includePrePost", "false"),
            ])
            .send()
            .map_err(|e| AppError::data_unavailable(symbol, format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AppError::data_unavailable(
                symbol,
                format!("HTTP {}: {}", status, compact_error_body(&body)),
            ));
        }

        let chart: ChartResponse = resp
            .json()
            .map_err(|e| AppError::data_unavailable(symbol, format!("malformed payload: {}", e)))?;
        let bars = parse_chart(symbol, chart)?;
        BarSeries::new(symbol, interval, bars)
    }
}
