//! Trading decision emitted by a strategy.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Enforce the one-position invariant: Buy while holding and Sell while
    /// flat both become Hold.
    pub fn clamp(self, has_position: bool) -> Signal {
        match (self, has_position) {
            (Signal::Buy, true) | (Signal::Sell, false) => Signal::Hold,
            (s, _) => s,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        };
        f.write_str(s)
    }
}

impl FromStr for Signal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Signal::Buy),
            "sell" => Ok(Signal::Sell),
            "hold" => Ok(Signal::Hold),
            other => Err(format!("unknown signal: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_rules() {
        assert_eq!(Signal::Buy.clamp(false), Signal::Buy);
        assert_eq!(Signal::Buy.clamp(true), Signal::Hold);
        assert_eq!(Signal::Sell.clamp(true), Signal::Sell);
        assert_eq!(Signal::Sell.clamp(false), Signal::Hold);
        assert_eq!(Signal::Hold.clamp(true), Signal::Hold);
        assert_eq!(Signal::Hold.clamp(false), Signal::Hold);
    }

    #[test]
    fn display_and_parse() {
        for s in [Signal::Buy, Signal::Sell, Signal::Hold] {
            assert_eq!(s.to_string().parse::<Signal>(), Ok(s));
        }
        assert_eq!(" SELL ".parse::<Signal>(), Ok(Signal::Sell));
        assert!("short".parse::<Signal>().is_err());
    }
}
