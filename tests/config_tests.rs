use chrono::NaiveTime;
use crossover_quant::config::{Config, LoopMode};
use crossover_quant::model::bar::BarInterval;
use crossover_quant::model::order::ExchangeSegment;

const TOML: &str = r#"
[market]
symbol = "^NSEI"
interval = "5m"

[strategy]
fast_span = 3
slow_span = 30

[order]
security_id = "1333"
exchange_segment = "NSE_EQ"
order_size = 1
stop_loss = 10.0
take_profit = 10.0

[schedule]
window_start = "09:45:00"
window_end = "14:30:00"
poll_interval_secs = 300

[output]
dir = "out"

[backtest]
start = "2024-02-28"
end = "2024-02-29"

[logging]
level = "debug"
"#;

#[test]
fn parse_minimal_toml_with_defaults() {
    let config = Config::from_toml_str(TOML).unwrap();
    assert_eq!(config.market.symbol, "^NSEI");
    assert_eq!(config.market.interval, BarInterval::FiveMinutes);
    assert_eq!(config.market.lookback_days, 0);
    assert_eq!(config.market.data_base_url, "https://query2.finance.yahoo.com");
    assert_eq!(config.strategy.signal_window, 3);
    assert_eq!(config.order.exchange_segment, ExchangeSegment::NseEquity);
    assert!(!config.order.dry_run);
    assert_eq!(config.schedule.mode, LoopMode::Live);
    assert_eq!(
        config.schedule.window_start,
        NaiveTime::from_hms_opt(9, 45, 0).unwrap()
    );
    assert_eq!(config.broker.base_url, "https://api.dhan.co");
    assert!(config.broker.credentials.access_token.is_empty());
    assert_eq!(
        config.output.artifact_path(),
        std::path::PathBuf::from("out/backtesting_signals_5min.html")
    );
    assert_eq!(config.logging.level, "debug");
    assert!(config.backtest.is_some());
}

#[test]
fn rejects_unknown_interval() {
    let bad = TOML.replace("interval = \"5m\"", "interval = \"7m\"");
    assert!(Config::from_toml_str(&bad).is_err());
}

#[test]
fn rejects_zero_span() {
    let bad = TOML.replace("fast_span = 3", "fast_span = 0");
    assert!(Config::from_toml_str(&bad).is_err());
}

#[test]
fn rejects_inverted_window() {
    let bad = TOML.replace("window_end = \"14:30:00\"", "window_end = \"09:00:00\"");
    assert!(Config::from_toml_str(&bad).is_err());
}

#[test]
fn rejects_zero_order_size() {
    let bad = TOML.replace("order_size = 1", "order_size = 0");
    assert!(Config::from_toml_str(&bad).is_err());
}

#[test]
fn backtest_mode_parses_lowercase() {
    let cfg = TOML.replace(
        "poll_interval_secs = 300",
        "poll_interval_secs = 300\nmode = \"backtest\"",
    );
    let config = Config::from_toml_str(&cfg).unwrap();
    assert_eq!(config.schedule.mode, LoopMode::Backtest);
    assert!(!config.requires_credentials());
    assert!(config.ensure_credentials().is_ok());
}

#[test]
fn shipped_default_config_parses() {
    let raw = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml"))
        .unwrap();
    let config = Config::from_toml_str(&raw).unwrap();
    assert_eq!(config.schedule.poll_interval_secs, 300);
    assert_eq!(config.order.security_id, "1333");
}
