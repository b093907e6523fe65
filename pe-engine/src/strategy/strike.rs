//! At-the-money strike selection and option symbols

use serde::{Deserialize, Serialize};

/// Option right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    pub fn suffix(&self) -> &'static str {
        match self {
            OptionRight::Call => "CE",
            OptionRight::Put => "PE",
        }
    }
}

/// Strike spacing: 50 points for NIFTY, 100 for every other index
pub fn strike_step(index_name: &str) -> u32 {
    if index_name.eq_ignore_ascii_case("NIFTY") {
        50
    } else {
        100
    }
}

/// Round `index_price` to the nearest multiple of `step`.
///
/// Exact midpoints go to the even multiple.
pub fn atm_strike(index_price: f64, step: u32) -> u32 {
    let step = f64::from(step.max(1));
    let strike = (index_price / step).round_ties_even() * step;
    strike.max(0.0) as u32
}

/// e.g. `NSE:NIFTY24JUL24000PE`
pub fn option_symbol(exchange: &str, index_name: &str, expiry: &str, strike: u32, right: OptionRight) -> String {
    format!("{}:{}{}{}{}", exchange, index_name, expiry, strike, right.suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_rounding() {
        assert_eq!(atm_strike(24000.0, 50), 24000);
        assert_eq!(atm_strike(24030.0, 50), 24050);
        assert_eq!(atm_strike(24024.9, 50), 24000);
        assert_eq!(atm_strike(51260.0, 100), 51300);
    }

    #[test]
    fn test_midpoint_goes_to_even_multiple() {
        assert_eq!(atm_strike(24025.0, 50), 24000);
        assert_eq!(atm_strike(24075.0, 50), 24100);
    }

    #[test]
    fn test_steps_and_symbol() {
        assert_eq!(strike_step("NIFTY"), 50);
        assert_eq!(strike_step("BANKNIFTY"), 100);
        assert_eq!(
            option_symbol("NSE", "NIFTY", "24JUL", 24050, OptionRight::Put),
            "NSE:NIFTY24JUL24050PE"
        );
    }
}
