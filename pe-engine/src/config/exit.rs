//! Exit management configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::Timeframe;
use crate::indicators::{DEFAULT_BB_MULTIPLIER, DEFAULT_BB_WINDOW};

/// Exit state machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    /// Timeframe of the option candles polled while a position is open
    pub timeframe: Timeframe,
    /// Days of option history fetched per poll
    pub lookback_days: u32,
    /// EMA period of the partial exit
    pub ema_period: usize,
    /// Bollinger window of the final exit
    pub bb_window: usize,
    /// Bollinger standard deviation multiplier
    pub bb_multiplier: f64,
    /// Delay between polls, in seconds
    pub poll_interval_secs: u64,
}

impl ExitConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Minutes(5),
            lookback_days: 1,
            ema_period: 20,
            bb_window: DEFAULT_BB_WINDOW,
            bb_multiplier: DEFAULT_BB_MULTIPLIER,
            poll_interval_secs: 30,
        }
    }
}
