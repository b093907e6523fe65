//! Staged exit state machine
//!
//! `HoldingFull -> PartialExited -> FullyExited`
//!
//! Each [`ExitMachine::step`] reads the latest option candles and applies two
//! triggers: half the original quantity is sold once the close reaches EMA-20,
//! and everything left is sold once the close reaches the upper Bollinger
//! band. Both legs may fire in the same step. A leg whose sell order fails
//! leaves the state where it was, so the next step retries the same leg.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ExitConfig;
use crate::data::CandleSeries;
use crate::exchange::{MarketDataProvider, OrderExecutor, OrderSide, OrderType};
use crate::indicators::{bollinger, latest_ema};
use crate::notify::{notify_best_effort, Notifier};
use crate::portfolio::Position;
use crate::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitState {
    HoldingFull,
    PartialExited,
    FullyExited,
}

/// Trigger evaluation for one poll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitTriggers {
    pub close: f64,
    pub ema: f64,
    /// `None` while fewer than `bb_window` candles are available
    pub upper_band: Option<f64>,
    /// close >= EMA
    pub partial: bool,
    /// close >= upper band
    pub final_exit: bool,
}

/// Evaluate both triggers on the latest close. `None` for an empty series.
pub fn exit_triggers(candles: &CandleSeries, config: &ExitConfig) -> Result<Option<ExitTriggers>> {
    let closes = candles.closes();
    let (Some(&close), Some(ema)) = (closes.last(), latest_ema(&closes, config.ema_period)?) else {
        return Ok(None);
    };

    let upper_band = bollinger(&closes, config.bb_window, config.bb_multiplier)?
        .latest()
        .map(|band| band.upper);

    Ok(Some(ExitTriggers {
        close,
        ema,
        upper_band,
        partial: close >= ema,
        final_exit: upper_band.is_some_and(|upper| close >= upper),
    }))
}

/// Which trigger sent the partial leg: `"EMA20"` or `"UPPER BB"`
pub fn partial_exit_label(triggers: &ExitTriggers, ema_period: usize) -> String {
    if triggers.partial {
        format!("EMA{}", ema_period)
    } else {
        "UPPER BB".to_string()
    }
}

/// Owns one position from entry until it is fully exited
#[derive(Debug, Clone)]
pub struct ExitMachine {
    position: Position,
    state: ExitState,
    config: ExitConfig,
}

impl ExitMachine {
    pub fn new(position: Position, config: ExitConfig) -> Self {
        Self {
            position,
            state: ExitState::HoldingFull,
            config,
        }
    }

    pub fn state(&self) -> ExitState {
        self.state
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn is_terminal(&self) -> bool {
        self.state == ExitState::FullyExited
    }

    /// Run one poll. Returns the state after the poll.
    ///
    /// Once `FullyExited`, returns immediately without fetching data or
    /// submitting orders.
    pub async fn step(
        &mut self,
        data: &dyn MarketDataProvider,
        orders: &dyn OrderExecutor,
        notifier: &dyn Notifier,
    ) -> Result<ExitState> {
        if self.is_terminal() {
            return Ok(self.state);
        }

        let symbol = self.position.symbol.clone();
        let candles = data
            .get_candles(&symbol, self.config.timeframe, self.config.lookback_days)
            .await?;
        let triggers = exit_triggers(&candles, &self.config)?.ok_or_else(|| {
            EngineError::data_unavailable(&symbol, self.config.timeframe, "no candles returned")
        })?;

        debug!(
            "🔎 {} close {:.2} EMA{} {:.2} upper {:?} state {:?}",
            symbol, triggers.close, self.config.ema_period, triggers.ema, triggers.upper_band, self.state
        );

        // Reaching the upper band while still holding full size takes the
        // partial leg first.
        if self.state == ExitState::HoldingFull && (triggers.partial || triggers.final_exit) {
            let quantity = self.position.partial_qty();
            if quantity > 0 {
                orders
                    .submit_order(&symbol, quantity, OrderSide::Sell, OrderType::Market)
                    .await?;
            } else {
                warn!("{}: half of {} is zero, nothing to sell on partial exit", symbol, self.position.total_qty);
            }
            self.position.record_partial_exit();
            self.state = ExitState::PartialExited;

            let label = partial_exit_label(&triggers, self.config.ema_period);
            info!("✅ 50% exit @ {}: sold {} {} at ~{:.2}", label, quantity, symbol, triggers.close);
            notify_best_effort(notifier, &format!("✅ 50% EXIT @ {} → {}", label, symbol)).await;
        }

        if self.state == ExitState::PartialExited && triggers.final_exit {
            let quantity = self.position.remaining_qty;
            orders
                .submit_order(&symbol, quantity, OrderSide::Sell, OrderType::Market)
                .await?;
            self.position.record_final_exit();
            self.state = ExitState::FullyExited;

            info!("🎯 Final exit @ upper band: sold {} {} at ~{:.2}", quantity, symbol, triggers.close);
            notify_best_effort(notifier, &format!("🎯 FINAL EXIT @ UPPER BB → {}", symbol)).await;
        }

        Ok(self.state)
    }

    /// Poll until fully exited, sleeping `poll_interval` between polls.
    ///
    /// Failed polls are logged and retried on the next interval.
    pub async fn run_to_completion(
        &mut self,
        data: &dyn MarketDataProvider,
        orders: &dyn OrderExecutor,
        notifier: &dyn Notifier,
    ) -> Position {
        info!(
            "🕐 Managing exit for {} x{} every {}s",
            self.position.symbol,
            self.position.remaining_qty,
            self.config.poll_interval_secs
        );

        loop {
            match self.step(data, orders, notifier).await {
                Ok(ExitState::FullyExited) => break,
                Ok(state) => debug!("{} still {:?}", self.position.symbol, state),
                Err(e) => warn!("⚠️ Exit poll for {} failed, retrying next poll: {}", self.position.symbol, e),
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }

        self.position.clone()
    }
}
