use std::path::PathBuf;

use crate::config::OrderConfig;
use crate::error::AppError;
use crate::model::order::{ExchangeSegment, OrderAck, OrderRequest, OrderSide};
use crate::model::signal::{Signal, SignalEvent};
use crate::sink::{ChartSink, OrderSink};
use crate::strategy::ema_crossover::DerivedSeries;

/// Stop-loss and take-profit distances.
///
/// Carried through configuration and the dispatcher but never attached to an
/// [`OrderRequest`]; bracket legs are not implemented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectiveLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Most recent buy and sell events, oldest first within each side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalWindow {
    pub buys: Vec<SignalEvent>,
    pub sells: Vec<SignalEvent>,
}

impl SignalWindow {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Buy wins when both sides have events.
    pub fn preferred_side(&self) -> Option<OrderSide> {
        if !self.buys.is_empty() {
            Some(OrderSide::Buy)
        } else if !self.sells.is_empty() {
            Some(OrderSide::Sell)
        } else {
            None
        }
    }
}

pub enum DispatchTarget<'a> {
    Live(&'a dyn OrderSink),
    Backtest(&'a dyn ChartSink),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    OrderSubmitted { request: OrderRequest, ack: OrderAck },
    NoSignal,
    ChartRendered(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    security_id: String,
    exchange_segment: ExchangeSegment,
    order_size: u32,
    protective: ProtectiveLevels,
    window: usize,
}

impl Dispatcher {
    pub fn new(
        security_id: &str,
        exchange_segment: ExchangeSegment,
        order_size: u32,
        protective: ProtectiveLevels,
        window: usize,
    ) -> Self {
        Self {
            security_id: security_id.to_string(),
            exchange_segment,
            order_size,
            protective,
            window,
        }
    }

    pub fn from_config(order: &OrderConfig, window: usize) -> Self {
        Self::new(
            &order.security_id,
            order.exchange_segment,
            order.order_size,
            ProtectiveLevels {
                stop_loss: order.stop_loss,
                take_profit: order.take_profit,
            },
            window,
        )
    }

    pub fn protective_levels(&self) -> ProtectiveLevels {
        self.protective
    }

    pub fn select(&self, derived: &DerivedSeries) -> SignalWindow {
        SignalWindow {
            buys: derived.last_events(Signal::Buy, self.window),
            sells: derived.last_events(Signal::Sell, self.window),
        }
    }

    pub fn order_for(&self, side: OrderSide) -> OrderRequest {
        OrderRequest::intraday_market(
            &self.security_id,
            self.exchange_segment,
            side,
            self.order_size,
        )
    }

    /// Route the latest signals to exactly one sink call.
    ///
    /// Live submits at most one order; backtest always renders, even with no
    /// markers to draw.
    pub fn dispatch(
        &self,
        derived: &DerivedSeries,
        target: DispatchTarget<'_>,
    ) -> Result<DispatchOutcome, AppError> {
        let window = self.select(derived);
        tracing::debug!(
            symbol = derived.symbol(),
            last_bar = ?derived.last_timestamp(),
            buys = window.buys.len(),
            sells = window.sells.len(),
            "Selected signal window"
        );

        match target {
            DispatchTarget::Live(sink) => {
                let Some(side) = window.preferred_side() else {
                    return Ok(DispatchOutcome::NoSignal);
                };
                let request = self.order_for(side);
                tracing::debug!(
                    stop_loss = self.protective.stop_loss,
                    take_profit = self.protective.take_profit,
                    "Protective levels not attached to order"
                );
                let ack = sink.place_order(&request)?;
                tracing::info!(
                    sink = sink.name(),
                    side = %side,
                    order_id = %ack.order_id,
                    status = %ack.status,
                    "Order submitted"
                );
                Ok(DispatchOutcome::OrderSubmitted { request, ack })
            }
            DispatchTarget::Backtest(sink) => {
                let path = sink.render(derived, &window.buys, &window.sells)?;
                tracing::info!(path = %path.display(), "Backtesting signals saved");
                Ok(DispatchOutcome::ChartRendered(path))
            }
        }
    }
}
