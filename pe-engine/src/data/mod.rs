//! Data management module
//!
//! Provides OHLCV candle data structures, timeframes and an in-memory store.

pub mod candle;
pub mod storage;
pub mod timeframe;

pub use candle::*;
pub use storage::*;
pub use timeframe::*;
