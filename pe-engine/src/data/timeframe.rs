//! Candle timeframes in broker resolution notation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Candle aggregation period.
///
/// The text form is the broker resolution: minutes as a bare number
/// (`"5"`, `"240"`) and `"1D"` for daily candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    Minutes(u32),
    Day,
}

impl Timeframe {
    /// Resolution string understood by the history endpoint
    pub fn resolution(&self) -> String {
        self.to_string()
    }

    /// Parse a comma separated list such as `"1D,240"`
    pub fn parse_list(list: &str) -> Result<Vec<Timeframe>, EngineError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Timeframe::from_str)
            .collect()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::Minutes(n) => write!(f, "{}", n),
            Timeframe::Day => write!(f, "1D"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1D" | "D" => Ok(Timeframe::Day),
            other => match other.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Timeframe::Minutes(n)),
                _ => Err(EngineError::Config(format!("Unsupported timeframe: {}", s))),
            },
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("1D".parse::<Timeframe>().unwrap(), Timeframe::Day);
        assert_eq!("d".parse::<Timeframe>().unwrap(), Timeframe::Day);
        assert_eq!("240".parse::<Timeframe>().unwrap(), Timeframe::Minutes(240));
        assert_eq!(Timeframe::Minutes(5).resolution(), "5");
        assert_eq!(Timeframe::Day.resolution(), "1D");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("0".parse::<Timeframe>().is_err());
        assert!("1H".parse::<Timeframe>().is_err());
        assert!("".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_parse_list_keeps_order() {
        let list = Timeframe::parse_list("30, 15,10").unwrap();
        assert_eq!(
            list,
            vec![Timeframe::Minutes(30), Timeframe::Minutes(15), Timeframe::Minutes(10)]
        );
    }
}
