use serde::{Deserialize, Serialize};

use crate::model::order::{ExchangeSegment, OrderSide, OrderType, ProductType};

#[derive(Debug, Clone, Copy, Serialize)]
pub enum Validity {
    #[serde(rename = "DAY")]
    Day,
}

/// Body of `POST /v2/orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanOrderBody<'a> {
    pub dhan_client_id: &'a str,
    pub correlation_id: String,
    pub transaction_type: OrderSide,
    pub exchange_segment: ExchangeSegment,
    pub product_type: ProductType,
    pub order_type: OrderType,
    pub validity: Validity,
    pub security_id: &'a str,
    pub quantity: u32,
    pub price: f64,
    pub after_market_order: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhanOrderResponse {
    pub order_id: String,
    #[serde(default)]
    pub order_status: Option<String>,
}
