use std::path::PathBuf;

use crate::error::AppError;
use crate::model::order::{OrderAck, OrderRequest};
use crate::model::signal::SignalEvent;
use crate::strategy::ema_crossover::DerivedSeries;

/// Accepts order requests. Callers do not track the order after the ack.
pub trait OrderSink {
    fn name(&self) -> &'static str;

    fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, AppError>;
}

/// Renders a derived series with its selected signal markers.
pub trait ChartSink {
    fn render(
        &self,
        derived: &DerivedSeries,
        buys: &[SignalEvent],
        sells: &[SignalEvent],
    ) -> Result<PathBuf, AppError>;
}

/// Logs orders instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunOrderSink;

impl OrderSink for DryRunOrderSink {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, AppError> {
        tracing::info!(
            security_id = %request.security_id,
            exchange_segment = %request.exchange_segment,
            side = %request.side,
            quantity = request.quantity,
            "Dry-run order (not sent)"
        );
        Ok(OrderAck {
            order_id: format!("dry-{}", uuid::Uuid::new_v4().simple()),
            status: "DRY_RUN".to_string(),
        })
    }
}
