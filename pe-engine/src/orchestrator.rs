//! Strategy orchestrator
//!
//! One [`Orchestrator::run_once`] per scheduler tick: read the index price,
//! run the signal checks, buy the ATM put on an entry signal and hold the tick
//! until the exit state machine has fully exited. Ticks never overlap; a tick
//! that fires while another is still running returns [`TickOutcome::Skipped`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StrategyConfig;
use crate::exchange::{MarketDataProvider, OrderExecutor, OrderResult, OrderSide, OrderType};
use crate::notify::{notify_best_effort, Notifier};
use crate::portfolio::{ExitMachine, Position};
use crate::strategy::{atm_strike, option_symbol, Signal, SignalDetector, SignalReason};
use crate::{EngineError, Result};

/// Result of one tick
#[derive(Debug, Clone, Serialize)]
pub enum TickOutcome {
    /// Another tick was still running
    Skipped,
    /// Checks ran and did not produce an entry
    NoEntry(Signal),
    /// A position was opened and fully exited
    Traded {
        signal: Signal,
        entry_order: OrderResult,
        position: Position,
    },
}

/// Clears the in-flight flag when the tick ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Orchestrator {
    config: StrategyConfig,
    detector: SignalDetector,
    data: Arc<dyn MarketDataProvider>,
    orders: Arc<dyn OrderExecutor>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        config: StrategyConfig,
        data: Arc<dyn MarketDataProvider>,
        orders: Arc<dyn OrderExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let detector = SignalDetector::new(config.detector.clone());
        Self {
            config,
            detector,
            data,
            orders,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a tick (and any position it opened) is being worked.
    pub fn is_trade_in_progress(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Latest close of the index on the price timeframe
    async fn index_price(&self) -> Result<f64> {
        let symbol = &self.config.index_symbol;
        let timeframe = self.config.price_timeframe;
        let candles = self.data.get_candles(symbol, timeframe, 1).await?;

        candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| EngineError::data_unavailable(symbol, timeframe, "no candles returned"))
    }

    /// Run one tick.
    pub async fn run_once(&self) -> Result<TickOutcome> {
        let Some(_guard) = RunGuard::acquire(&self.in_flight) else {
            warn!("⏳ Previous tick still running, skipping");
            return Ok(TickOutcome::Skipped);
        };

        let index = &self.config.index_symbol;
        let price = self.index_price().await?;
        debug!("📊 {} at {:.2}", index, price);

        let signal = self.detector.evaluate(self.data.as_ref(), index).await?;
        let breakout_tf = match signal.reason {
            SignalReason::Confluence { timeframe, ema_period } => {
                info!("🚫 HTF confluence on {} EMA{}, no trade", timeframe, ema_period);
                return Ok(TickOutcome::NoEntry(signal));
            }
            SignalReason::NoBreakout => {
                info!("👀 No HTF confluence, waiting for LTF confirmation");
                notify_best_effort(
                    self.notifier.as_ref(),
                    &format!("👀 {}: no HTF confluence, waiting for LTF confirmation", self.config.index_name),
                )
                .await;
                return Ok(TickOutcome::NoEntry(signal));
            }
            SignalReason::Breakout { timeframe } => timeframe,
        };

        let strike = atm_strike(price, self.config.strike_step());
        let symbol = option_symbol(
            &self.config.exchange,
            &self.config.index_name,
            &self.config.option_expiry,
            strike,
            self.config.option_right,
        );

        let entry_order = self
            .orders
            .submit_order(&symbol, self.config.quantity, OrderSide::Buy, OrderType::Market)
            .await?;
        info!(
            "🛒 Bought {} x{} (order {}) on {} breakout",
            symbol, entry_order.quantity, entry_order.order_id, breakout_tf
        );
        notify_best_effort(
            self.notifier.as_ref(),
            &format!("🛒 BUY {} x{} @ ATM {} ({} breakout)", symbol, self.config.quantity, strike, breakout_tf),
        )
        .await;

        let position = Position::new(symbol, self.config.quantity);
        let mut exit = ExitMachine::new(position, self.config.exit.clone());
        let position = exit
            .run_to_completion(self.data.as_ref(), self.orders.as_ref(), self.notifier.as_ref())
            .await;
        info!("🏁 Trade on {} complete", position.symbol);

        Ok(TickOutcome::Traded {
            signal,
            entry_order,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = RunGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(RunGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(RunGuard::acquire(&flag).is_some());
    }
}
