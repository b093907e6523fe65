//! Strategy configuration

use serde::{Deserialize, Serialize};

use crate::config::ExitConfig;
use crate::data::Timeframe;
use crate::indicators::{DEFAULT_BB_MULTIPLIER, DEFAULT_BB_WINDOW};
use crate::strategy::{strike_step, OptionRight};

/// Signal detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Higher timeframes, longest first. Evaluated in this order.
    pub htf_timeframes: Vec<Timeframe>,
    /// Days of history fetched per higher timeframe
    pub htf_lookback_days: u32,
    /// EMA periods tested for confluence, in this order
    pub ema_periods: Vec<usize>,
    /// Relative distance to an EMA that counts as confluence (0.0015 = 0.15%)
    pub confluence_tolerance: f64,
    /// Lower timeframes checked for a breakout, in this order
    pub ltf_timeframes: Vec<Timeframe>,
    /// Days of history fetched per lower timeframe
    pub ltf_lookback_days: u32,
    /// Bollinger window
    pub bb_window: usize,
    /// Bollinger standard deviation multiplier
    pub bb_multiplier: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            htf_timeframes: vec![Timeframe::Day, Timeframe::Minutes(240)],
            htf_lookback_days: 60,
            ema_periods: vec![5, 9, 20, 50],
            confluence_tolerance: 0.0015,
            ltf_timeframes: vec![
                Timeframe::Minutes(30),
                Timeframe::Minutes(15),
                Timeframe::Minutes(10),
            ],
            ltf_lookback_days: 5,
            bb_window: DEFAULT_BB_WINDOW,
            bb_multiplier: DEFAULT_BB_MULTIPLIER,
        }
    }
}

/// Strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Index name used in option symbols (e.g., "NIFTY", "BANKNIFTY")
    pub index_name: String,
    /// Underlying symbol the signals are computed on
    pub index_symbol: String,
    /// Exchange prefix of option symbols
    pub exchange: String,
    /// Expiry code inserted into option symbols (e.g., "24JUL")
    pub option_expiry: String,
    /// Option side bought on entry
    pub option_right: OptionRight,
    /// Fixed order quantity
    pub quantity: u32,
    /// Timeframe the current index price is read from
    pub price_timeframe: Timeframe,
    pub detector: DetectorConfig,
    pub exit: ExitConfig,
}

impl StrategyConfig {
    /// NIFTY defaults with the given expiry code
    pub fn new(option_expiry: impl Into<String>) -> Self {
        Self {
            index_name: "NIFTY".to_string(),
            index_symbol: "NSE:NIFTY50-INDEX".to_string(),
            exchange: "NSE".to_string(),
            option_expiry: option_expiry.into(),
            option_right: OptionRight::Put,
            quantity: 50,
            price_timeframe: Timeframe::Minutes(1),
            detector: DetectorConfig::default(),
            exit: ExitConfig::default(),
        }
    }

    /// Strike spacing for the configured index
    pub fn strike_step(&self) -> u32 {
        strike_step(&self.index_name)
    }
}
