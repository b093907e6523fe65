//! Engine error kinds

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Upstream could not serve the requested candle range.
    #[error("Data unavailable for {symbol} ({timeframe}): {reason}")]
    DataUnavailable {
        symbol: String,
        timeframe: String,
        reason: String,
    },

    #[error("Order rejected for {symbol}: {reason}")]
    OrderRejected { symbol: String, reason: String },

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Never fatal, see [`crate::notify::notify_best_effort`].
    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Indicator calculation error: {0}")]
    Indicator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn data_unavailable(
        symbol: impl Into<String>,
        timeframe: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::DataUnavailable {
            symbol: symbol.into(),
            timeframe: timeframe.to_string(),
            reason: reason.into(),
        }
    }

    /// Errors raised while talking to the broker about an order.
    pub fn is_order_failure(&self) -> bool {
        matches!(
            self,
            EngineError::OrderRejected { .. } | EngineError::Connectivity(_)
        )
    }
}
