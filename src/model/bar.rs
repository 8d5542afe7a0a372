use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Strictly above the open; a flat candle counts as bearish.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// Sampling interval accepted by the bar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum BarInterval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    Daily,
    Weekly,
}

impl BarInterval {
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            BarInterval::OneMinute => "1m",
            BarInterval::FiveMinutes => "5m",
            BarInterval::FifteenMinutes => "15m",
            BarInterval::ThirtyMinutes => "30m",
            BarInterval::OneHour => "60m",
            BarInterval::Daily => "1d",
            BarInterval::Weekly => "1wk",
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, BarInterval::Daily | BarInterval::Weekly)
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_provider_str())
    }
}

impl FromStr for BarInterval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(BarInterval::OneMinute),
            "5m" => Ok(BarInterval::FiveMinutes),
            "15m" => Ok(BarInterval::FifteenMinutes),
            "30m" => Ok(BarInterval::ThirtyMinutes),
            "60m" | "1h" => Ok(BarInterval::OneHour),
            "1d" => Ok(BarInterval::Daily),
            "1wk" => Ok(BarInterval::Weekly),
            other => Err(AppError::Config(format!(
                "invalid interval '{}': expected one of 1m/5m/15m/30m/60m/1d/1wk",
                other
            ))),
        }
    }
}

impl TryFrom<String> for BarInterval {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Time-ordered bars for one symbol at one interval.
#[derive(Debug, Clone)]
pub struct BarSeries {
    symbol: String,
    interval: BarInterval,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Rejects bars whose timestamps are not strictly increasing.
    pub fn new(symbol: &str, interval: BarInterval, bars: Vec<Bar>) -> Result<Self, AppError> {
        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AppError::data_unavailable(
                symbol,
                format!("bar {} does not advance past {}", pos + 1, bars[pos].timestamp),
            ));
        }
        Ok(Self {
            symbol: symbol.to_string(),
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> BarInterval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(secs: i64, open: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 0,
        }
    }

    #[test]
    fn flat_candle_is_bearish() {
        assert!(bar(0, 100.0, 101.0).is_bullish());
        assert!(!bar(0, 100.0, 100.0).is_bullish());
        assert!(!bar(0, 100.0, 99.0).is_bullish());
    }

    #[test]
    fn series_rejects_non_increasing_timestamps() {
        let bars = vec![bar(60, 1.0, 1.0), bar(60, 1.0, 1.0)];
        let err = BarSeries::new("X", BarInterval::Daily, bars).unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable { .. }));
    }

    #[test]
    fn interval_round_trips_provider_strings() {
        for s in ["1m", "5m", "15m", "30m", "60m", "1d", "1wk"] {
            assert_eq!(s.parse::<BarInterval>().unwrap().as_provider_str(), s);
        }
        assert_eq!("1h".parse::<BarInterval>().unwrap(), BarInterval::OneHour);
        assert!("2m".parse::<BarInterval>().is_err());
        assert!(BarInterval::FiveMinutes.is_intraday());
        assert!(!BarInterval::Daily.is_intraday());
    }
}
