use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dhan::rest::DEFAULT_BASE_URL as DHAN_BASE_URL;
use crate::model::bar::BarInterval;
use crate::model::order::ExchangeSegment;
use crate::yahoo::rest::DEFAULT_BASE_URL as YAHOO_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub strategy: StrategyConfig,
    pub order: OrderConfig,
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub backtest: Option<BacktestConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub symbol: String,
    pub interval: BarInterval,
    #[serde(default)]
    pub lookback_days: u32,
    #[serde(default = "default_data_base_url")]
    pub data_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub fast_span: usize,
    pub slow_span: usize,
    #[serde(default = "default_signal_window")]
    pub signal_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
    pub security_id: String,
    pub exchange_segment: ExchangeSegment,
    pub order_size: u32,
    /// Accepted but not attached to orders.
    #[serde(default)]
    pub stop_loss: f64,
    /// Accepted but not attached to orders.
    #[serde(default)]
    pub take_profit: f64,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    Live,
    Backtest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    pub window_start: NaiveTime,
    pub window_end: NaiveTime,
    pub poll_interval_secs: u64,
    #[serde(default = "default_loop_mode")]
    pub mode: LoopMode,
}

#[derive(Debug, Clone, Default)]
pub struct BrokerCredentials {
    pub client_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_base_url")]
    pub base_url: String,
    #[serde(skip)]
    pub credentials: BrokerCredentials,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: default_broker_base_url(),
            credentials: BrokerCredentials::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

fn default_data_base_url() -> String {
    YAHOO_BASE_URL.to_string()
}

fn default_broker_base_url() -> String {
    DHAN_BASE_URL.to_string()
}

fn default_signal_window() -> usize {
    3
}

fn default_loop_mode() -> LoopMode {
    LoopMode::Live
}

fn default_file_name() -> String {
    "backtesting_signals_5min.html".to_string()
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl OutputConfig {
    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl Config {
    /// Credentials are only needed when orders actually leave the process.
    pub fn requires_credentials(&self) -> bool {
        self.schedule.mode == LoopMode::Live && !self.order.dry_run
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.symbol.trim().is_empty() {
            bail!("market.symbol must not be empty");
        }
        if self.strategy.fast_span == 0 || self.strategy.slow_span == 0 {
            bail!(
                "strategy spans must be >= 1 (fast_span={}, slow_span={})",
                self.strategy.fast_span,
                self.strategy.slow_span
            );
        }
        if self.strategy.signal_window == 0 {
            bail!("strategy.signal_window must be >= 1");
        }
        if self.order.order_size == 0 {
            bail!("order.order_size must be >= 1");
        }
        if self.order.security_id.trim().is_empty() {
            bail!("order.security_id must not be empty");
        }
        if self.schedule.window_start >= self.schedule.window_end {
            bail!(
                "schedule.window_start {} must be before window_end {}",
                self.schedule.window_start,
                self.schedule.window_end
            );
        }
        if self.schedule.poll_interval_secs == 0 {
            bail!("schedule.poll_interval_secs must be > 0");
        }
        if let Some(bt) = &self.backtest {
            if bt.start >= bt.end {
                bail!("backtest.start {} must be before end {}", bt.start, bt.end);
            }
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default config file and require broker credentials when the
    /// configuration sends live orders.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?;
        config.ensure_credentials()?;
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config = Self::from_toml_str(&config_str)
            .with_context(|| format!("invalid config in {}", config_path.display()))?;

        config.broker.credentials.client_id = std::env::var("DHAN_CLIENT_ID").unwrap_or_default();
        config.broker.credentials.access_token =
            std::env::var("DHAN_ACCESS_TOKEN").unwrap_or_default();

        Ok(config)
    }

    pub fn ensure_credentials(&self) -> Result<()> {
        if !self.requires_credentials() {
            return Ok(());
        }
        if self.broker.credentials.client_id.is_empty() {
            bail!("DHAN_CLIENT_ID not set in .env or environment");
        }
        if self.broker.credentials.access_token.is_empty() {
            bail!("DHAN_ACCESS_TOKEN not set in .env or environment");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                symbol: "^NSEI".to_string(),
                interval: BarInterval::FiveMinutes,
                lookback_days: 0,
                data_base_url: default_data_base_url(),
            },
            strategy: StrategyConfig {
                fast_span: 3,
                slow_span: 30,
                signal_window: default_signal_window(),
            },
            order: OrderConfig {
                security_id: "1333".to_string(),
                exchange_segment: ExchangeSegment::NseEquity,
                order_size: 1,
                stop_loss: 10.0,
                take_profit: 10.0,
                dry_run: false,
            },
            schedule: ScheduleConfig {
                window_start: NaiveTime::from_hms_opt(9, 45, 0).unwrap_or_default(),
                window_end: NaiveTime::from_hms_opt(14, 30, 0).unwrap_or_default(),
                poll_interval_secs: 300,
                mode: LoopMode::Live,
            },
            broker: BrokerConfig::default(),
            output: OutputConfig {
                dir: PathBuf::from("backtesting"),
                file_name: default_file_name(),
            },
            backtest: None,
            logging: LoggingConfig::default(),
        }
    }
}
