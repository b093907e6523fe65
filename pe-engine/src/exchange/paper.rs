//! Paper order execution
//!
//! Fills every order immediately and keeps a ledger. Used for dry runs
//! against live data and as the order collaborator in tests. A number of
//! upcoming submissions can be set to be rejected to exercise failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::exchange::{OrderExecutor, OrderResult, OrderSide, OrderType};
use crate::{EngineError, Result};

#[derive(Debug, Default)]
pub struct PaperExecutor {
    ledger: Mutex<Vec<OrderResult>>,
    pending_rejections: AtomicUsize,
    attempts: AtomicUsize,
}

impl PaperExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` submissions with [`EngineError::OrderRejected`].
    pub fn reject_next(&self, count: usize) {
        self.pending_rejections.store(count, Ordering::SeqCst);
    }

    /// Filled orders, in submission order
    pub fn orders(&self) -> Vec<OrderResult> {
        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Quantities of filled orders on one side
    pub fn quantities(&self, side: OrderSide) -> Vec<u32> {
        self.orders()
            .into_iter()
            .filter(|o| o.side == side)
            .map(|o| o.quantity)
            .collect()
    }

    /// Every call to `submit_order`, rejected ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn take_rejection(&self) -> bool {
        self.pending_rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl OrderExecutor for PaperExecutor {
    async fn submit_order(
        &self,
        symbol: &str,
        quantity: u32,
        side: OrderSide,
        order_type: OrderType,
    ) -> Result<OrderResult> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.take_rejection() {
            return Err(EngineError::OrderRejected {
                symbol: symbol.to_string(),
                reason: "paper rejection".to_string(),
            });
        }

        let order = OrderResult::new(
            format!("paper-{}", Uuid::new_v4()),
            symbol.to_string(),
            side,
            order_type,
            quantity,
        );
        info!("📝 Paper {} {} x{} ({})", side, symbol, quantity, order.order_id);

        self.ledger
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(order.clone());
        Ok(order)
    }
}
