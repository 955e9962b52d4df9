//! MACD signal-line crossover strategy.

use crate::domain::signal::Signal;
use crate::domain::strategy::{SignalContext, Strategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdStrategy;

impl Strategy for MacdStrategy {
    fn name(&self) -> &'static str {
        "macd"
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        let macd = ctx.snapshot.macd;
        if macd.bullish_crossover {
            Signal::Buy
        } else if macd.bearish_crossover {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
