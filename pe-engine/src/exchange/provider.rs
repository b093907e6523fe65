//! Collaborator interfaces for market data and order placement
//!
//! The engine never talks to a broker directly; the runtime injects
//! implementations of these traits, constructed once at startup.

use async_trait::async_trait;

use crate::data::{CandleSeries, Timeframe};
use crate::exchange::{OrderResult, OrderSide, OrderType};
use crate::Result;

/// Source of historical candles.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Candles for `symbol` at `timeframe` covering the last `lookback_days`,
    /// oldest first. Fails with [`crate::EngineError::DataUnavailable`].
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback_days: u32,
    ) -> Result<CandleSeries>;
}

/// Order placement.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Fails with [`crate::EngineError::OrderRejected`] or
    /// [`crate::EngineError::Connectivity`]; on failure nothing was placed.
    async fn submit_order(
        &self,
        symbol: &str,
        quantity: u32,
        side: OrderSide,
        order_type: OrderType,
    ) -> Result<OrderResult>;
}
