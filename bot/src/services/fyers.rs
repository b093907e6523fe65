//! Fyers REST adapter
//!
//! Market data comes from the history endpoint, orders go to the v2 orders
//! endpoint. Both authenticate with `client_id:access_token`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Asia::Kolkata;
use pe_engine::data::{Candle, CandleSeries, Timeframe};
use pe_engine::exchange::{MarketDataProvider, OrderExecutor, OrderResult, OrderSide, OrderType};
use pe_engine::EngineError;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    s: String,
    #[serde(default)]
    candles: Vec<Vec<f64>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    s: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct FyersClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    access_token: String,
}

impl FyersClient {
    pub fn new(base_url: String, client_id: String, access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            access_token,
        }
    }

    fn auth_header(&self) -> String {
        format!("{}:{}", self.client_id, self.access_token)
    }
}

/// `range_from` / `range_to` as IST calendar dates
pub fn history_range(now: DateTime<Utc>, lookback_days: u32) -> (String, String) {
    let today = now.with_timezone(&Kolkata).date_naive();
    let from = today - Duration::days(i64::from(lookback_days));
    (from.format("%Y-%m-%d").to_string(), today.format("%Y-%m-%d").to_string())
}

/// Convert `[epoch, o, h, l, c, v]` rows into a normalized series.
/// Malformed rows are dropped.
pub fn candles_from_rows(rows: &[Vec<f64>]) -> CandleSeries {
    let mut series: CandleSeries = rows
        .iter()
        .filter_map(|row| match row.as_slice() {
            [ts, open, high, low, close, volume, ..] => {
                Candle::from_epoch(*ts as i64, *open, *high, *low, *close, *volume)
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .into();
    series.normalize();
    series
}

/// Request body for a day intraday order
pub fn order_payload(symbol: &str, quantity: u32, side: OrderSide, order_type: OrderType) -> serde_json::Value {
    json!({
        "symbol": symbol,
        "qty": quantity,
        "type": match order_type {
            OrderType::Limit => 1,
            OrderType::Market => 2,
        },
        "side": match side {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        },
        "productType": "INTRADAY",
        "limitPrice": 0,
        "stopPrice": 0,
        "validity": "DAY",
        "disclosedQty": 0,
        "offlineOrder": "False",
    })
}

#[async_trait]
impl MarketDataProvider for FyersClient {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback_days: u32,
    ) -> pe_engine::Result<CandleSeries> {
        let (range_from, range_to) = history_range(Utc::now(), lookback_days);
        let resolution = timeframe.resolution();
        debug!("📥 History {} {} {}..{}", symbol, resolution, range_from, range_to);

        let response = self
            .http
            .get(format!("{}/data-rest/v2/history/", self.base_url))
            .header("Authorization", self.auth_header())
            .query(&[
                ("symbol", symbol),
                ("resolution", resolution.as_str()),
                ("date_format", "1"),
                ("range_from", range_from.as_str()),
                ("range_to", range_to.as_str()),
                ("cont_flag", "1"),
            ])
            .send()
            .await
            .map_err(|e| EngineError::data_unavailable(symbol, timeframe, e.to_string()))?;

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| EngineError::data_unavailable(symbol, timeframe, e.to_string()))?;

        if body.s != "ok" {
            let reason = body.message.unwrap_or_else(|| format!("status {}", body.s));
            return Err(EngineError::data_unavailable(symbol, timeframe, reason));
        }

        Ok(candles_from_rows(&body.candles))
    }
}

#[async_trait]
impl OrderExecutor for FyersClient {
    async fn submit_order(
        &self,
        symbol: &str,
        quantity: u32,
        side: OrderSide,
        order_type: OrderType,
    ) -> pe_engine::Result<OrderResult> {
        let response = self
            .http
            .post(format!("{}/api/v2/orders", self.base_url))
            .header("Authorization", self.auth_header())
            .json(&order_payload(symbol, quantity, side, order_type))
            .send()
            .await
            .map_err(|e| EngineError::Connectivity(e.to_string()))?;

        let body: OrderResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Connectivity(e.to_string()))?;

        if body.s != "ok" {
            let reason = body.message.unwrap_or_else(|| format!("status {}", body.s));
            warn!("❌ {} {} x{} rejected: {}", side, symbol, quantity, reason);
            return Err(EngineError::OrderRejected {
                symbol: symbol.to_string(),
                reason,
            });
        }

        let order_id = body.id.unwrap_or_default();
        info!("📤 {} {} x{} accepted (order {})", side, symbol, quantity, order_id);
        Ok(OrderResult::new(order_id, symbol.to_string(), side, order_type, quantity))
    }
}
