//! Bollinger Bands indicator

use serde::{Deserialize, Serialize};

use crate::{EngineError, Result};

/// Default trailing window
pub const DEFAULT_BB_WINDOW: usize = 20;
/// Default standard deviation multiplier
pub const DEFAULT_BB_MULTIPLIER: f64 = 2.0;

/// Bands at one index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Three series aligned with the input. Entries before the first full
/// window are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }

    /// Bands at `index`, if the window there is fully populated
    pub fn at(&self, index: usize) -> Option<BandPoint> {
        Some(BandPoint {
            upper: (*self.upper.get(index)?)?,
            middle: (*self.middle.get(index)?)?,
            lower: (*self.lower.get(index)?)?,
        })
    }

    /// Bands at the last index
    pub fn latest(&self) -> Option<BandPoint> {
        self.len().checked_sub(1).and_then(|i| self.at(i))
    }
}

/// Compute Bollinger Bands over a trailing `window`.
///
/// Middle is the simple moving average; the envelope uses the sample
/// standard deviation (n - 1 denominator).
pub fn bollinger(values: &[f64], window: usize, multiplier: f64) -> Result<BollingerBands> {
    if window < 2 {
        return Err(EngineError::Indicator(format!(
            "Bollinger window must be at least 2, got {}",
            window
        )));
    }

    let head = values.len().min(window - 1);
    let mut middle = vec![None; head];
    let mut upper = vec![None; head];
    let mut lower = vec![None; head];

    for slice in values.windows(window) {
        let n = window as f64;
        let mean = slice.iter().sum::<f64>() / n;
        let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let spread = multiplier * variance.sqrt();

        middle.push(Some(mean));
        upper.push(Some(mean + spread));
        lower.push(Some(mean - spread));
    }

    Ok(BollingerBands { middle, upper, lower })
}
