//! Data storage and retrieval
//!
//! An in-memory [`MarketDataProvider`] for replaying recorded candles.
//! Lookback windows are measured back from the latest stored candle of each
//! series, so replayed data behaves the same regardless of the wall clock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;

use crate::data::{Candle, CandleSeries, Timeframe};
use crate::exchange::MarketDataProvider;
use crate::{EngineError, Result};

/// In-memory data storage
#[derive(Debug, Default)]
pub struct DataStorage {
    /// Store candles by symbol and timeframe
    candles: HashMap<String, Vec<Candle>>,
    /// Every `get_candles` request, as `symbol:timeframe`
    fetches: Mutex<Vec<String>>,
}

impl DataStorage {
    /// Create new storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get storage key from symbol and timeframe
    fn key(symbol: &str, timeframe: Timeframe) -> String {
        format!("{}:{}", symbol, timeframe)
    }

    /// Add candles to a series, keeping it ordered and free of duplicates
    pub fn add_candles(&mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        let entry = self.candles.entry(Self::key(symbol, timeframe)).or_default();
        entry.extend(candles);

        let mut series = CandleSeries::from_vec(std::mem::take(entry));
        series.normalize();
        *entry = series.into_vec();
    }

    /// Replace a series outright
    pub fn set_candles(&mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) {
        self.candles.remove(&Self::key(symbol, timeframe));
        self.add_candles(symbol, timeframe, candles);
    }

    /// Requests served so far, oldest first
    pub fn fetches(&self) -> Vec<String> {
        self.fetches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Get number of stored candles
    pub fn len(&self) -> usize {
        self.candles.values().map(|v| v.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MarketDataProvider for DataStorage {
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        lookback_days: u32,
    ) -> Result<CandleSeries> {
        let key = Self::key(symbol, timeframe);
        self.fetches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        let stored = self
            .candles
            .get(&key)
            .ok_or_else(|| EngineError::data_unavailable(symbol, timeframe, "no candles stored"))?;

        let Some(latest) = stored.last() else {
            return Ok(CandleSeries::new());
        };
        let since = latest.timestamp - Duration::days(i64::from(lookback_days));

        Ok(stored
            .iter()
            .filter(|c| c.timestamp >= since)
            .cloned()
            .collect::<Vec<_>>()
            .into())
    }
}
