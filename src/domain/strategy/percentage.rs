//! Take-profit / average-down wrapper around volatility breakout.

use crate::domain::signal::Signal;
use crate::domain::strategy::volatility_breakout::{VolatilityBreakoutStrategy, DEFAULT_K};
use crate::domain::strategy::{CandleInterval, SignalContext, Strategy};

pub const DEFAULT_BUY_PCT: f64 = 0.20;
pub const DEFAULT_SELL_PCT: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct PercentageStrategy {
    /// Drawdown from the average buy price that triggers another buy.
    pub buy_pct: f64,
    /// Gain over the average buy price that triggers a sell.
    pub sell_pct: f64,
    breakout: VolatilityBreakoutStrategy,
}

impl PercentageStrategy {
    pub fn new(buy_pct: f64, sell_pct: f64, k: f64) -> Self {
        Self {
            buy_pct,
            sell_pct,
            breakout: VolatilityBreakoutStrategy::new(k),
        }
    }

    pub fn breakout(&self) -> &VolatilityBreakoutStrategy {
        &self.breakout
    }
}

impl Default for PercentageStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_BUY_PCT, DEFAULT_SELL_PCT, DEFAULT_K)
    }
}

impl Strategy for PercentageStrategy {
    fn name(&self) -> &'static str {
        "percentage"
    }

    fn interval(&self) -> CandleInterval {
        CandleInterval::Daily
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        // always consulted so the breakout state machine sees every tick
        let vb_signal = self.breakout.generate_signal(ctx);

        let avg = match ctx.avg_buy_price {
            Some(avg) if avg != 0.0 => avg,
            _ => return vb_signal,
        };

        let change = (ctx.current_price - avg) / avg;
        if change >= self.sell_pct {
            Signal::Sell
        } else if change <= -self.buy_pct && vb_signal != Signal::Sell {
            Signal::Buy
        } else {
            vb_signal
        }
    }
}
