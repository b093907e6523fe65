//! PE-Engine: decision engine for an intraday index put-buying strategy
//!
//! The crate turns streams of price candles into an enter / hold / exit
//! decision and manages a live option position through a staged exit:
//! - [ta-rs](https://github.com/greyblake/ta-rs) for the exponential smoothing
//! - pluggable market data, order execution and notification collaborators
//!
//! # Features
//!
//! - **Data Management**: OHLCV candles, timeframes and an in-memory replay store
//! - **Technical Indicators**: EMA and Bollinger Bands
//! - **Signal Detection**: higher-timeframe EMA confluence, lower-timeframe Bollinger breakout
//! - **Exit Management**: partial exit at EMA-20, final exit at the upper band
//! - **Orchestration**: one non-reentrant `run_once` per scheduler tick
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pe_engine::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let data = Arc::new(DataStorage::new());
//!     let orders = Arc::new(PaperExecutor::new());
//!     let notifier = Arc::new(LogNotifier);
//!     let config = StrategyConfig::new("24JUL");
//!     let orchestrator = Orchestrator::new(config, data, orders, notifier);
//!     let outcome = orchestrator.run_once().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod exchange;
pub mod indicators;
pub mod notify;
pub mod orchestrator;
pub mod portfolio;
pub mod strategy;

pub use error::EngineError;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DetectorConfig, ExitConfig, StrategyConfig};
    pub use crate::data::*;
    pub use crate::error::EngineError;
    pub use crate::exchange::*;
    pub use crate::indicators::*;
    pub use crate::notify::*;
    pub use crate::orchestrator::*;
    pub use crate::portfolio::{exit_triggers, ExitMachine, ExitState, ExitTriggers, Position};
    pub use crate::strategy::*;
    pub use crate::Result;
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
