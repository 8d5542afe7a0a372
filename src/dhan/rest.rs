use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::config::BrokerCredentials;
use crate::error::AppError;
use crate::http::compact_error_body;
use crate::model::order::{OrderAck, OrderRequest};
use crate::sink::OrderSink;

use super::types::{DhanOrderBody, DhanOrderResponse, Validity};

pub const DEFAULT_BASE_URL: &str = "https://api.dhan.co";

/// Blocking DhanHQ v2 order client.
pub struct DhanRestClient {
    http: reqwest::blocking::Client,
    base_url: String,
    client_id: String,
}

impl DhanRestClient {
    pub fn new(base_url: &str, credentials: &BrokerCredentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "access-token",
            HeaderValue::from_str(&credentials.access_token)
                .context("DHAN_ACCESS_TOKEN is not a valid header value")?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build Dhan HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: credentials.client_id.clone(),
        })
    }
}

pub(crate) fn order_body<'a>(client_id: &'a str, request: &'a OrderRequest) -> DhanOrderBody<'a> {
    DhanOrderBody {
        dhan_client_id: client_id,
        correlation_id: uuid::Uuid::new_v4().simple().to_string(),
        transaction_type: request.side,
        exchange_segment: request.exchange_segment,
        product_type: request.product_type,
        order_type: request.order_type,
        validity: Validity::Day,
        security_id: &request.security_id,
        quantity: request.quantity,
        price: request.price,
        after_market_order: false,
    }
}

impl OrderSink for DhanRestClient {
    fn name(&self) -> &'static str {
        "dhan"
    }

    fn place_order(&self, request: &OrderRequest) -> Result<OrderAck, AppError> {
        let url = format!("{}/v2/orders", self.base_url);
        let body = order_body(&self.client_id, request);

        tracing::info!(
            security_id = %request.security_id,
            exchange_segment = %request.exchange_segment,
            side = %request.side,
            quantity = request.quantity,
            correlation_id = %body.correlation_id,
            "Placing market order"
        );

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| AppError::sink_failure("dhan", format!("place_order HTTP failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(AppError::sink_failure(
                "dhan",
                format!("HTTP {}: {}", status, compact_error_body(&text)),
            ));
        }

        let parsed: DhanOrderResponse = resp
            .json()
            .map_err(|e| AppError::sink_failure("dhan", format!("order response parse failed: {}", e)))?;
        Ok(OrderAck {
            order_id: parsed.order_id,
            status: parsed.order_status.unwrap_or_else(|| "UNKNOWN".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub;
    use crate::model::order::{ExchangeSegment, OrderSide};

    fn client(base_url: &str) -> DhanRestClient {
        let credentials = BrokerCredentials {
            client_id: "1102524211".to_string(),
            access_token: "token".to_string(),
        };
        DhanRestClient::new(base_url, &credentials).unwrap()
    }

    fn buy_request() -> OrderRequest {
        OrderRequest::intraday_market("1333", ExchangeSegment::NseEquity, OrderSide::Buy, 1)
    }

    #[test]
    fn rejected_order_is_sink_failure_with_status_and_body() {
        let base = stub::serve_once(
            "400 Bad Request",
            "application/json",
            r#"{"errorCode":"DH-905",   "errorMessage":"bad"}"#,
        );
        match client(&base).place_order(&buy_request()).unwrap_err() {
            AppError::SinkFailure { sink, cause } => {
                assert_eq!(sink, "dhan");
                assert!(cause.starts_with("HTTP 400 Bad Request"), "{cause}");
                assert!(cause.contains(r#""errorCode":"DH-905", "errorMessage""#), "{cause}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepted_order_returns_ack() {
        let base = stub::serve_once(
            "200 OK",
            "application/json",
            r#"{"orderId":"112111182198","orderStatus":"PENDING"}"#,
        );
        let ack = client(&base).place_order(&buy_request()).unwrap();
        assert_eq!(ack.order_id, "112111182198");
        assert_eq!(ack.status, "PENDING");
    }

    #[test]
    fn order_body_uses_broker_field_names() {
        let request =
            OrderRequest::intraday_market("1333", ExchangeSegment::NseEquity, OrderSide::Sell, 2);
        let body = order_body("1102524211", &request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["dhanClientId"], "1102524211");
        assert_eq!(json["transactionType"], "SELL");
        assert_eq!(json["exchangeSegment"], "NSE_EQ");
        assert_eq!(json["productType"], "INTRADAY");
        assert_eq!(json["orderType"], "MARKET");
        assert_eq!(json["validity"], "DAY");
        assert_eq!(json["securityId"], "1333");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["price"], 0.0);
        assert_eq!(json["afterMarketOrder"], false);
        assert_eq!(json["correlationId"].as_str().unwrap().len(), 32);
    }

    #[test]
    fn response_tolerates_missing_status() {
        let parsed: DhanOrderResponse = serde_json::from_str(r#"{"orderId":"112111182198"}"#).unwrap();
        assert_eq!(parsed.order_id, "112111182198");
        assert!(parsed.order_status.is_none());
    }
}
