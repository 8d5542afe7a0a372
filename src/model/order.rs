use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderSide {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderType {
    #[serde(rename = "MARKET")]
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProductType {
    #[serde(rename = "INTRADAY")]
    Intraday,
}

/// Exchange segment codes as the broker names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeSegment {
    #[serde(rename = "NSE_EQ")]
    NseEquity,
    #[serde(rename = "BSE_EQ")]
    BseEquity,
    #[serde(rename = "NSE_FNO")]
    NseDerivatives,
    #[serde(rename = "IDX_I")]
    Index,
}

impl ExchangeSegment {
    pub fn as_broker_str(&self) -> &'static str {
        match self {
            ExchangeSegment::NseEquity => "NSE_EQ",
            ExchangeSegment::BseEquity => "BSE_EQ",
            ExchangeSegment::NseDerivatives => "NSE_FNO",
            ExchangeSegment::Index => "IDX_I",
        }
    }
}

impl fmt::Display for ExchangeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_broker_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub security_id: String,
    pub exchange_segment: ExchangeSegment,
    pub side: OrderSide,
    pub quantity: u32,
    pub order_type: OrderType,
    pub product_type: ProductType,
    /// Zero for market orders.
    pub price: f64,
}

impl OrderRequest {
    pub fn intraday_market(
        security_id: &str,
        exchange_segment: ExchangeSegment,
        side: OrderSide,
        quantity: u32,
    ) -> Self {
        Self {
            security_id: security_id.to_string(),
            exchange_segment,
            side,
            quantity,
            order_type: OrderType::Market,
            product_type: ProductType::Intraday,
            price: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub status: String,
}
