use anyhow::Result;

use crossover_quant::chart::HtmlChartSink;
use crossover_quant::config::{Config, LoopMode};
use crossover_quant::dhan::rest::DhanRestClient;
use crossover_quant::logging;
use crossover_quant::polling::{PollingLoop, SystemScheduler};
use crossover_quant::sink::{DryRunOrderSink, OrderSink};
use crossover_quant::yahoo::rest::YahooChartClient;

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure .env exists with DHAN_CLIENT_ID and DHAN_ACCESS_TOKEN, or set order.dry_run = true");
            std::process::exit(1);
        }
    };

    logging::init(&config.logging);

    tracing::info!(
        symbol = %config.market.symbol,
        interval = %config.market.interval,
        mode = ?config.schedule.mode,
        dry_run = config.order.dry_run,
        "Starting crossover-quant"
    );

    let source = YahooChartClient::new(&config.market.data_base_url)?;
    let order_sink: Box<dyn OrderSink> =
        if config.order.dry_run || config.schedule.mode == LoopMode::Backtest {
            Box::new(DryRunOrderSink)
        } else {
            Box::new(DhanRestClient::new(
                &config.broker.base_url,
                &config.broker.credentials,
            )?)
        };
    let chart_sink = HtmlChartSink::new(
        config.output.artifact_path(),
        &format!(
            "{} {} with {}/{} EMA and signals",
            config.market.symbol,
            config.market.interval,
            config.strategy.fast_span,
            config.strategy.slow_span
        ),
    );

    let mut polling = PollingLoop::new(
        &config,
        SystemScheduler,
        Box::new(source),
        order_sink,
        Box::new(chart_sink),
    );
    polling.run()
}
