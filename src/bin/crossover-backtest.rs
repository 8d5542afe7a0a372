use std::path::Path;

use anyhow::{Context, Result};

use crossover_quant::chart::HtmlChartSink;
use crossover_quant::config::{Config, DEFAULT_CONFIG_PATH};
use crossover_quant::dispatcher::{DispatchOutcome, DispatchTarget, Dispatcher};
use crossover_quant::indicator::volatility;
use crossover_quant::logging;
use crossover_quant::source::BarSource;
use crossover_quant::strategy::ema_crossover;
use crossover_quant::yahoo::rest::YahooChartClient;

/// Fetch the configured backtest range once and render the signal chart.
fn main() -> Result<()> {
    let config = Config::load_from(Path::new(DEFAULT_CONFIG_PATH))?;

    logging::init(&config.logging);

    let range = config
        .backtest
        .clone()
        .context("[backtest] section with start and end dates is required")?;

    let source = YahooChartClient::new(&config.market.data_base_url)?;
    let series = source
        .fetch(&config.market.symbol, range.start, range.end, config.market.interval)
        .context("backtest fetch failed")?;
    tracing::info!(symbol = %config.market.symbol, bars = series.len(), "Fetched backtest bars");

    match volatility::estimate(&series) {
        Ok(v) => tracing::info!(volatility = v, "Volatility"),
        Err(e) => tracing::warn!(error = %e, "Volatility unavailable"),
    }

    let derived = ema_crossover::compute(
        &series,
        config.strategy.fast_span,
        config.strategy.slow_span,
    );
    let dispatcher = Dispatcher::from_config(&config.order, config.strategy.signal_window);
    let sink = HtmlChartSink::new(
        config.output.artifact_path(),
        &format!(
            "{} {} backtest {} to {}",
            config.market.symbol, config.market.interval, range.start, range.end
        ),
    );

    if let DispatchOutcome::ChartRendered(path) =
        dispatcher.dispatch(&derived, DispatchTarget::Backtest(&sink))?
    {
        println!("Backtesting signals saved at: {}", path.display());
    }
    Ok(())
}
