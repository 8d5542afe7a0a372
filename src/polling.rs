use std::fmt;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::{Config, LoopMode};
use crate::dispatcher::{DispatchOutcome, DispatchTarget, Dispatcher};
use crate::error::AppError;
use crate::indicator::volatility;
use crate::model::bar::BarInterval;
use crate::sink::{ChartSink, OrderSink};
use crate::source::BarSource;
use crate::strategy::ema_crossover;

/// Clock and sleep capability for the polling loop.
pub trait Scheduler {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn sleep(&mut self, duration: Duration);
}

/// Real clock, blocking sleep.
#[derive(Debug, Default)]
pub struct SystemScheduler;

impl Scheduler for SystemScheduler {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Daily window, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TradingWindow {
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Active,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Idle => write!(f, "IDLE"),
            LoopState::Active => write!(f, "ACTIVE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub bars: usize,
    pub volatility: Option<f64>,
    pub outcome: DispatchOutcome,
}

/// What one pass of the loop did.
#[derive(Debug)]
pub enum TickReport {
    Idle,
    Completed(CycleReport),
    Abandoned(AppError),
}

pub struct PollingLoop<S: Scheduler> {
    symbol: String,
    interval: BarInterval,
    lookback_days: u32,
    fast_span: usize,
    slow_span: usize,
    mode: LoopMode,
    window: TradingWindow,
    poll_interval: Duration,
    dispatcher: Dispatcher,
    scheduler: S,
    source: Box<dyn BarSource>,
    order_sink: Box<dyn OrderSink>,
    chart_sink: Box<dyn ChartSink>,
    state: LoopState,
}

impl<S: Scheduler> PollingLoop<S> {
    pub fn new(
        config: &Config,
        scheduler: S,
        source: Box<dyn BarSource>,
        order_sink: Box<dyn OrderSink>,
        chart_sink: Box<dyn ChartSink>,
    ) -> Self {
        Self {
            symbol: config.market.symbol.clone(),
            interval: config.market.interval,
            lookback_days: config.market.lookback_days,
            fast_span: config.strategy.fast_span,
            slow_span: config.strategy.slow_span,
            mode: config.schedule.mode,
            window: TradingWindow {
                start: config.schedule.window_start,
                end: config.schedule.window_end,
            },
            poll_interval: config.schedule.poll_interval(),
            dispatcher: Dispatcher::from_config(&config.order, config.strategy.signal_window),
            scheduler,
            source,
            order_sink,
            chart_sink,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Runs until the process is killed.
    pub fn run(&mut self) -> ! {
        tracing::info!(
            symbol = %self.symbol,
            interval = %self.interval,
            window_start = %self.window.start,
            window_end = %self.window.end,
            poll_secs = self.poll_interval.as_secs(),
            "Polling loop started"
        );
        loop {
            self.tick();
        }
    }

    /// One iteration: re-evaluate the window, work if active, then sleep.
    pub fn tick(&mut self) -> TickReport {
        let now = self.scheduler.now();
        let next = if self.window.contains(now.time()) {
            LoopState::Active
        } else {
            LoopState::Idle
        };
        if next != self.state {
            tracing::info!(from = %self.state, to = %next, at = %now, "Trading window transition");
            self.state = next;
        }

        let report = match self.state {
            LoopState::Idle => TickReport::Idle,
            LoopState::Active => match self.run_cycle(now.date()) {
                Ok(report) => TickReport::Completed(report),
                Err(e) => {
                    tracing::warn!(symbol = %self.symbol, error = %e, "Cycle abandoned");
                    TickReport::Abandoned(e)
                }
            },
        };

        self.scheduler.sleep(self.poll_interval);
        report
    }

    fn fetch_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(today);
        let end = today.checked_add_days(Days::new(1)).unwrap_or(today);
        (start, end)
    }

    fn run_cycle(&self, today: NaiveDate) -> Result<CycleReport, AppError> {
        let (start, end) = self.fetch_range(today);
        let series = self.source.fetch(&self.symbol, start, end, self.interval)?;
        tracing::info!(
            source = self.source.name(),
            symbol = %self.symbol,
            bars = series.len(),
            "Fetched bars"
        );

        let volatility = match volatility::estimate(&series) {
            Ok(v) => {
                tracing::info!(volatility = v, "Volatility");
                Some(v)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Volatility unavailable");
                None
            }
        };

        let derived = ema_crossover::compute(&series, self.fast_span, self.slow_span);
        let target = match self.mode {
            LoopMode::Live => DispatchTarget::Live(self.order_sink.as_ref()),
            LoopMode::Backtest => DispatchTarget::Backtest(self.chart_sink.as_ref()),
        };
        let outcome = self.dispatcher.dispatch(&derived, target)?;
        if outcome == DispatchOutcome::NoSignal {
            tracing::info!(symbol = %self.symbol, "No signal in window");
        }

        Ok(CycleReport {
            bars: series.len(),
            volatility,
            outcome,
        })
    }
}
