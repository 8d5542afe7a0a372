use std::cell::RefCell;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use crossover_quant::dispatcher::{
    DispatchOutcome, DispatchTarget, Dispatcher, ProtectiveLevels,
};
use crossover_quant::error::AppError;
use crossover_quant::model::bar::{Bar, BarInterval, BarSeries};
use crossover_quant::model::order::{
    ExchangeSegment, OrderAck, OrderRequest, OrderSide, OrderType, ProductType,
};
use crossover_quant::model::signal::{Signal, SignalEvent};
use crossover_quant::sink::{ChartSink, OrderSink};
use crossover_quant::strategy::ema_crossover::{compute, DerivedSeries};

#[derive(Default)]
struct RecordingOrderSink {
    placed: RefCell<Vec<OrderRequest>>,
    fail: bool,
}

impl OrderSink for RecordingOrderSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, AppError> {
        if self.fail {
            return Err(AppError::sink_failure("recording", "rejected"));
        }
        self.placed.borrow_mut().push(request.clone());
        Ok(OrderAck {
            order_id: format!("ord-{}", self.placed.borrow().len()),
            status: "TRANSIT".to_string(),
        })
    }
}

#[derive(Default)]
struct RecordingChartSink {
    renders: RefCell<Vec<(usize, Vec<SignalEvent>, Vec<SignalEvent>)>>,
}

impl ChartSink for RecordingChartSink {
    fn render(
        &self,
        derived: &DerivedSeries,
        buys: &[SignalEvent],
        sells: &[SignalEvent],
    ) -> Result<PathBuf, AppError> {
        self.renders
            .borrow_mut()
            .push((derived.len(), buys.to_vec(), sells.to_vec()));
        Ok(PathBuf::from("chart.html"))
    }
}

fn derived(opens: &[f64], closes: &[f64]) -> DerivedSeries {
    let bars = opens
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&open, &close))| Bar {
            timestamp: Utc.timestamp_opt(1_709_092_800 + 300 * i as i64, 0).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 10,
        })
        .collect();
    let series = BarSeries::new("^NSEI", BarInterval::FiveMinutes, bars).unwrap();
    compute(&series, 1, 3)
}

/// Buy at bar 2, sell at bar 4.
fn buy_and_sell() -> DerivedSeries {
    derived(
        &[99.0, 103.0, 91.0, 87.0, 111.0],
        &[100.0, 102.0, 90.0, 88.0, 110.0],
    )
}

fn no_signals() -> DerivedSeries {
    derived(&[99.0, 100.0, 101.0], &[100.0, 101.0, 102.0])
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        "1333",
        ExchangeSegment::NseEquity,
        5,
        ProtectiveLevels {
            stop_loss: 10.0,
            take_profit: 10.0,
        },
        3,
    )
}

#[test]
fn buy_wins_when_both_sides_present() {
    let d = buy_and_sell();
    let window = dispatcher().select(&d);
    assert_eq!(window.buys.len(), 1);
    assert_eq!(window.sells.len(), 1);

    let sink = RecordingOrderSink::default();
    let outcome = dispatcher()
        .dispatch(&d, DispatchTarget::Live(&sink))
        .unwrap();

    let placed = sink.placed.borrow();
    assert_eq!(placed.len(), 1);
    let order = &placed[0];
    assert_eq!(order.side, OrderSide::Buy);
    assert_eq!(order.security_id, "1333");
    assert_eq!(order.exchange_segment, ExchangeSegment::NseEquity);
    assert_eq!(order.quantity, 5);
    assert_eq!(order.order_type, OrderType::Market);
    assert_eq!(order.product_type, ProductType::Intraday);
    assert_eq!(order.price, 0.0);
    assert!(matches!(
        outcome,
        DispatchOutcome::OrderSubmitted { ref request, .. } if request.side == OrderSide::Buy
    ));
}

#[test]
fn sell_only_submits_sell() {
    let d = derived(&[99.0, 97.0, 111.0], &[100.0, 98.0, 110.0]);
    let sink = RecordingOrderSink::default();
    dispatcher().dispatch(&d, DispatchTarget::Live(&sink)).unwrap();
    let placed = sink.placed.borrow();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].side, OrderSide::Sell);
}

#[test]
fn no_signals_submits_nothing() {
    let sink = RecordingOrderSink::default();
    let outcome = dispatcher()
        .dispatch(&no_signals(), DispatchTarget::Live(&sink))
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::NoSignal);
    assert!(sink.placed.borrow().is_empty());
}

#[test]
fn empty_series_submits_nothing() {
    let sink = RecordingOrderSink::default();
    let outcome = dispatcher()
        .dispatch(&derived(&[99.0], &[100.0]), DispatchTarget::Live(&sink))
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::NoSignal);
}

#[test]
fn sink_failure_propagates() {
    let sink = RecordingOrderSink {
        fail: true,
        ..Default::default()
    };
    let err = dispatcher()
        .dispatch(&buy_and_sell(), DispatchTarget::Live(&sink))
        .unwrap_err();
    assert!(matches!(err, AppError::SinkFailure { sink: "recording", .. }));
}

#[test]
fn backtest_renders_without_orders() {
    let chart = RecordingChartSink::default();
    let outcome = dispatcher()
        .dispatch(&buy_and_sell(), DispatchTarget::Backtest(&chart))
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::ChartRendered(PathBuf::from("chart.html")));

    let renders = chart.renders.borrow();
    assert_eq!(renders.len(), 1);
    let (len, buys, sells) = &renders[0];
    assert_eq!(*len, 5);
    assert_eq!(buys[0].index, 2);
    assert_eq!(buys[0].signal, Signal::Buy);
    assert_eq!(sells[0].index, 4);
    assert_eq!(sells[0].signal, Signal::Sell);
}

#[test]
fn backtest_renders_with_no_signals() {
    let chart = RecordingChartSink::default();
    dispatcher()
        .dispatch(&no_signals(), DispatchTarget::Backtest(&chart))
        .unwrap();
    let renders = chart.renders.borrow();
    assert_eq!(renders.len(), 1);
    assert!(renders[0].1.is_empty());
    assert!(renders[0].2.is_empty());
}

#[test]
fn protective_levels_stay_off_the_order() {
    let d = dispatcher();
    assert_eq!(d.protective_levels().stop_loss, 10.0);
    let request = d.order_for(OrderSide::Sell);
    assert_eq!(
        request,
        OrderRequest::intraday_market("1333", ExchangeSegment::NseEquity, OrderSide::Sell, 5)
    );
}
