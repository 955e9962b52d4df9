//! RSI threshold strategy.

use crate::domain::signal::Signal;
use crate::domain::strategy::{SignalContext, Strategy};

pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy)]
pub struct RsiStrategy {
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiStrategy {
    pub fn new(oversold: f64, overbought: f64) -> Self {
        Self {
            oversold,
            overbought,
        }
    }
}

impl Default for RsiStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_OVERSOLD, DEFAULT_OVERBOUGHT)
    }
}

impl Strategy for RsiStrategy {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        let rsi = ctx.snapshot.rsi;
        if rsi < self.oversold {
            Signal::Buy
        } else if rsi > self.overbought {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
