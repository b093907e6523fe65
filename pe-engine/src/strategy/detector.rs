//! Multi-timeframe signal detection
//!
//! Two independent checks over the index:
//! - higher-timeframe confluence: the latest close is within a relative
//!   tolerance of one of several EMAs
//! - lower-timeframe breakout: the latest candle closed down but still above
//!   its upper Bollinger band
//!
//! Both walk their timeframe list in the configured order and stop at the
//! first hit, so later timeframes are never fetched once one matches. A
//! timeframe with too little history is skipped rather than treated as a
//! match or a failure. Fetch errors propagate to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::data::{Candle, Timeframe};
use crate::exchange::MarketDataProvider;
use crate::indicators::{bollinger, latest_ema};
use crate::strategy::Signal;
use crate::Result;

/// First timeframe/EMA pair found near the latest close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceHit {
    pub timeframe: Timeframe,
    pub ema_period: usize,
    pub ema: f64,
    pub close: f64,
}

/// First timeframe whose latest candle closed down above the upper band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutHit {
    pub timeframe: Timeframe,
    pub open: f64,
    pub close: f64,
    pub upper_band: f64,
}

/// First `(period, ema)` in `emas` with `|close - ema| / ema <= tolerance`
pub fn first_within_tolerance(close: f64, emas: &[(usize, f64)], tolerance: f64) -> Option<(usize, f64)> {
    emas.iter()
        .copied()
        .find(|&(_, ema)| ((close - ema) / ema).abs() <= tolerance)
}

/// Confluence on one series of closes. `None` when `closes` is empty.
pub fn confluence_on(closes: &[f64], periods: &[usize], tolerance: f64) -> Result<Option<(usize, f64)>> {
    let Some(&close) = closes.last() else {
        return Ok(None);
    };

    let mut emas = Vec::with_capacity(periods.len());
    for &period in periods {
        if let Some(ema) = latest_ema(closes, period)? {
            emas.push((period, ema));
        }
    }

    Ok(first_within_tolerance(close, &emas, tolerance))
}

/// Upper band at the last candle if it closed down above it.
/// `None` when there are fewer than `window` candles.
pub fn breakout_on(candles: &[Candle], window: usize, multiplier: f64) -> Result<Option<f64>> {
    let Some(last) = candles.last() else {
        return Ok(None);
    };

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let Some(band) = bollinger(&closes, window, multiplier)?.latest() else {
        return Ok(None);
    };

    if last.is_bearish() && last.close > band.upper {
        Ok(Some(band.upper))
    } else {
        Ok(None)
    }
}

/// Signal detector over a market data collaborator
#[derive(Debug, Clone)]
pub struct SignalDetector {
    config: DetectorConfig,
}

impl SignalDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Higher-timeframe EMA confluence
    pub async fn check_confluence(
        &self,
        data: &dyn MarketDataProvider,
        symbol: &str,
    ) -> Result<Option<ConfluenceHit>> {
        for &timeframe in &self.config.htf_timeframes {
            let candles = data
                .get_candles(symbol, timeframe, self.config.htf_lookback_days)
                .await?;
            if candles.is_empty() {
                debug!("⏭️ {} {}: no candles, skipping confluence check", symbol, timeframe);
                continue;
            }

            let closes = candles.closes();
            let found = confluence_on(
                &closes,
                &self.config.ema_periods,
                self.config.confluence_tolerance,
            )?;

            if let Some((ema_period, ema)) = found {
                let close = closes[closes.len() - 1];
                info!(
                    "📏 Confluence on {} {}: close {:.2} within {:.2}% of EMA{} {:.2}",
                    symbol,
                    timeframe,
                    close,
                    self.config.confluence_tolerance * 100.0,
                    ema_period,
                    ema
                );
                return Ok(Some(ConfluenceHit {
                    timeframe,
                    ema_period,
                    ema,
                    close,
                }));
            }
        }

        Ok(None)
    }

    /// Lower-timeframe Bollinger breakout
    pub async fn check_breakout(
        &self,
        data: &dyn MarketDataProvider,
        symbol: &str,
    ) -> Result<Option<BreakoutHit>> {
        for &timeframe in &self.config.ltf_timeframes {
            let candles = data
                .get_candles(symbol, timeframe, self.config.ltf_lookback_days)
                .await?;
            if candles.len() < self.config.bb_window {
                debug!(
                    "⏭️ {} {}: {} candles < window {}, skipping breakout check",
                    symbol,
                    timeframe,
                    candles.len(),
                    self.config.bb_window
                );
                continue;
            }

            let found = breakout_on(
                candles.candles(),
                self.config.bb_window,
                self.config.bb_multiplier,
            )?;

            if let (Some(upper_band), Some(last)) = (found, candles.last()) {
                info!(
                    "🔻 Breakout on {} {}: open {:.2} close {:.2} above upper band {:.2}",
                    symbol, timeframe, last.open, last.close, upper_band
                );
                return Ok(Some(BreakoutHit {
                    timeframe,
                    open: last.open,
                    close: last.close,
                    upper_band,
                }));
            }
        }

        Ok(None)
    }

    /// Confluence first; the breakout check only runs when clear of confluence.
    pub async fn evaluate(&self, data: &dyn MarketDataProvider, symbol: &str) -> Result<Signal> {
        if let Some(hit) = self.check_confluence(data, symbol).await? {
            return Ok(Signal::confluence(&hit));
        }

        Ok(match self.check_breakout(data, symbol).await? {
            Some(hit) => Signal::breakout(&hit),
            None => Signal::no_breakout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn candle(i: i64, open: f64, close: f64) -> Candle {
        let base = Utc.with_ymd_and_hms(2024, 7, 1, 3, 45, 0).unwrap();
        Candle::new(
            base + Duration::minutes(30 * i),
            open,
            open.max(close),
            open.min(close),
            close,
            0.0,
        )
    }

    fn flat_then(last_open: f64, last_close: f64) -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..19).map(|i| candle(i, 100.0, 100.0)).collect();
        candles.push(candle(19, last_open, last_close));
        candles
    }

    #[test]
    fn test_close_equal_to_one_ema_is_confluence() {
        let emas = [(5, 100.0), (9, 95.0), (20, 90.0), (50, 85.0)];
        assert_eq!(first_within_tolerance(100.0, &emas, 0.0015), Some((5, 100.0)));

        let emas = [(5, 110.0), (9, 100.0), (20, 90.0), (50, 85.0)];
        assert_eq!(first_within_tolerance(100.0, &emas, 0.0015), Some((9, 100.0)));
    }

    #[test]
    fn test_one_percent_away_is_not_confluence() {
        let emas = [(5, 101.0), (9, 99.0), (20, 101.0), (50, 99.0)];
        assert_eq!(first_within_tolerance(100.0, &emas, 0.0015), None);
    }

    #[test]
    fn test_tolerance_boundary() {
        // 0.1% away: inside; 0.2% away: outside
        assert!(first_within_tolerance(100.1, &[(20, 100.0)], 0.0015).is_some());
        assert!(first_within_tolerance(100.2, &[(20, 100.0)], 0.0015).is_none());
    }

    #[test]
    fn test_first_ema_in_order_wins() {
        let closes = vec![100.0; 60];
        let found = confluence_on(&closes, &[5, 9, 20, 50], 0.0015).unwrap();
        assert_eq!(found.map(|(p, _)| p), Some(5));
    }

    #[test]
    fn test_jump_away_from_emas_is_clear() {
        let mut closes = vec![100.0; 59];
        closes.push(110.0);
        assert_eq!(confluence_on(&closes, &[5, 9, 20, 50], 0.0015).unwrap(), None);
        assert_eq!(confluence_on(&[], &[5], 0.0015).unwrap(), None);
    }

    #[test]
    fn test_bearish_close_above_band_is_breakout() {
        // upper band = 101 + 2 * sqrt(20) ~= 109.94
        let upper = breakout_on(&flat_then(130.0, 120.0), 20, 2.0).unwrap();
        assert!(upper.is_some());
        assert!((upper.unwrap() - (101.0 + 2.0 * 20f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_bullish_close_above_band_is_not_breakout() {
        assert_eq!(breakout_on(&flat_then(110.0, 120.0), 20, 2.0).unwrap(), None);
    }

    #[test]
    fn test_bearish_close_inside_band_is_not_breakout() {
        assert_eq!(breakout_on(&flat_then(101.0, 99.5), 20, 2.0).unwrap(), None);
    }

    #[test]
    fn test_thin_history_is_not_breakout() {
        let candles = &flat_then(130.0, 120.0)[5..];
        assert_eq!(breakout_on(candles, 20, 2.0).unwrap(), None);
    }
}
