//! Position tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live option position.
///
/// `remaining_qty` only ever decreases and `partial_exit_done` flips to true
/// at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Option symbol (e.g., "NSE:NIFTY24JUL24000PE")
    pub symbol: String,
    /// Quantity bought on entry
    pub total_qty: u32,
    /// Quantity still held
    pub remaining_qty: u32,
    /// Whether the half-size exit has been executed
    pub partial_exit_done: bool,
    /// Entry time
    pub entry_time: DateTime<Utc>,
}

impl Position {
    /// Create new position
    pub fn new(symbol: impl Into<String>, quantity: u32) -> Self {
        Self {
            symbol: symbol.into(),
            total_qty: quantity,
            remaining_qty: quantity,
            partial_exit_done: false,
            entry_time: Utc::now(),
        }
    }

    /// Half of the original quantity, rounded down
    pub fn partial_qty(&self) -> u32 {
        self.total_qty / 2
    }

    /// Record a filled partial exit. Returns false if one was already recorded.
    pub fn record_partial_exit(&mut self) -> bool {
        if self.partial_exit_done {
            return false;
        }
        self.remaining_qty = self.remaining_qty.saturating_sub(self.partial_qty());
        self.partial_exit_done = true;
        true
    }

    /// Record that everything still held was sold
    pub fn record_final_exit(&mut self) {
        self.remaining_qty = 0;
    }

    pub fn is_closed(&self) -> bool {
        self.remaining_qty == 0
    }
}
