//! Bollinger band reversion strategy: buy near the lower band, sell near the upper.

use crate::domain::signal::Signal;
use crate::domain::strategy::{SignalContext, Strategy};

pub const BUY_BELOW: f64 = 0.05;
pub const SELL_ABOVE: f64 = 0.95;

#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerStrategy;

impl Strategy for BollingerStrategy {
    fn name(&self) -> &'static str {
        "bb"
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        let pos = ctx.snapshot.bb_position;
        if pos < BUY_BELOW {
            Signal::Buy
        } else if pos > SELL_ABOVE {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
