//! EMA (Exponential Moving Average) indicator

use ta::indicators::ExponentialMovingAverage;
use ta::Next;

use crate::{EngineError, Result};

/// Lazily smooth `values` with `alpha = 2 / (period + 1)`.
///
/// The first output equals the first input; there is no warm-up gap, so the
/// output has exactly as many items as the input.
pub fn ema(values: &[f64], period: usize) -> Result<impl Iterator<Item = f64> + '_> {
    let mut inner = ExponentialMovingAverage::new(period)
        .map_err(|e| EngineError::Indicator(format!("EMA({}): {:?}", period, e)))?;

    Ok(values.iter().map(move |&value| inner.next(value)))
}

/// Calculate EMA from a series of values
pub fn calculate_ema(values: &[f64], period: usize) -> Result<Vec<f64>> {
    Ok(ema(values, period)?.collect())
}

/// EMA at the last value, `None` for an empty series
pub fn latest_ema(values: &[f64], period: usize) -> Result<Option<f64>> {
    Ok(ema(values, period)?.last())
}
