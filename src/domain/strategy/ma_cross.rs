//! Moving-average cross strategy.
//!
//! Golden cross: price has moved above both MA5 and MA20 while MA5 is still
//! below MA20. Dead cross: price has fallen below both while MA5 is still
//! above MA20. The MA5/MA20 relation lags price, so it stands in for the
//! ordering as of the previous bar.

use crate::domain::signal::Signal;
use crate::domain::strategy::{SignalContext, Strategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct MaCrossStrategy;

impl Strategy for MaCrossStrategy {
    fn name(&self) -> &'static str {
        "ma"
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        let t = ctx.snapshot.ma_trend;
        if !t.ma5_above_ma20 && t.above_ma5 && t.above_ma20 {
            Signal::Buy
        } else if t.ma5_above_ma20 && !t.above_ma5 && !t.above_ma20 {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}
