//! Signal produced by one evaluation pass

use serde::{Deserialize, Serialize};

use crate::data::Timeframe;
use crate::strategy::{BreakoutHit, ConfluenceHit};

/// Why a signal came out the way it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalReason {
    /// Latest close sits within tolerance of an EMA on a higher timeframe
    Confluence { timeframe: Timeframe, ema_period: usize },
    /// Clear of confluence, but no lower timeframe closed down above its upper band
    NoBreakout,
    /// Clear of confluence and a bearish close above the upper band on `timeframe`
    Breakout { timeframe: Timeframe },
}

/// Immutable verdict of the signal detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub confluence: bool,
    pub breakout: bool,
    pub reason: SignalReason,
}

impl Signal {
    /// Create confluence signal (never an entry)
    pub fn confluence(hit: &ConfluenceHit) -> Self {
        Self {
            confluence: true,
            breakout: false,
            reason: SignalReason::Confluence {
                timeframe: hit.timeframe,
                ema_period: hit.ema_period,
            },
        }
    }

    /// Create no-breakout signal
    pub fn no_breakout() -> Self {
        Self {
            confluence: false,
            breakout: false,
            reason: SignalReason::NoBreakout,
        }
    }

    /// Create entry signal
    pub fn breakout(hit: &BreakoutHit) -> Self {
        Self {
            confluence: false,
            breakout: true,
            reason: SignalReason::Breakout {
                timeframe: hit.timeframe,
            },
        }
    }

    /// Enter only when clear of confluence and confirmed by a breakout
    pub fn is_entry(&self) -> bool {
        !self.confluence && self.breakout
    }
}
