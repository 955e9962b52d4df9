//! Volatility breakout strategy.
//!
//! Target = today's open + (previous high - previous low) × k, read from the
//! last two daily candles. Buys once price reaches the target. Every day
//! between 09:00:00 and 09:05:00 inclusive (the exchange's daily candle
//! rollover) it liquidates and forgets the target, which is then recomputed
//! from the new candles on the next evaluation outside the window.

use crate::domain::candle::Candle;
use crate::domain::signal::Signal;
use crate::domain::strategy::{CandleInterval, SignalContext, Strategy};
use chrono::NaiveTime;

pub const DEFAULT_K: f64 = 0.5;

pub const DAILY_RESET_START: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => panic!("invalid reset start"),
};

pub const DAILY_RESET_END: NaiveTime = match NaiveTime::from_hms_opt(9, 5, 0) {
    Some(t) => t,
    None => panic!("invalid reset end"),
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetState {
    NoTarget,
    TargetSet(f64),
}

#[derive(Debug, Clone)]
pub struct VolatilityBreakoutStrategy {
    k: f64,
    state: TargetState,
}

impl VolatilityBreakoutStrategy {
    pub fn new(k: f64) -> Self {
        Self {
            k,
            state: TargetState::NoTarget,
        }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn state(&self) -> TargetState {
        self.state
    }
}

impl Default for VolatilityBreakoutStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_K)
    }
}

/// Whether `t` falls in the daily liquidation window.
pub fn in_reset_window(t: NaiveTime) -> bool {
    (DAILY_RESET_START..=DAILY_RESET_END).contains(&t)
}

/// Breakout target for the day opening at `today_open`.
pub fn breakout_target(previous: &Candle, today_open: f64, k: f64) -> f64 {
    today_open + previous.range() * k
}

/// Target from the last two candles of a daily series.
pub fn target_from_series(candles: &[Candle], k: f64) -> Option<f64> {
    match candles {
        [.., previous, today] => Some(breakout_target(previous, today.open, k)),
        _ => None,
    }
}

impl Strategy for VolatilityBreakoutStrategy {
    fn name(&self) -> &'static str {
        "volatility"
    }

    fn interval(&self) -> CandleInterval {
        CandleInterval::Daily
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        if in_reset_window(ctx.current_time) {
            self.state = TargetState::NoTarget;
            return Signal::Sell;
        }

        if self.state == TargetState::NoTarget {
            if let Some(target) = target_from_series(ctx.snapshot.candles, self.k) {
                self.state = TargetState::TargetSet(target);
            }
        }

        match self.state {
            TargetState::TargetSet(target) if ctx.current_price >= target => Signal::Buy,
            _ => Signal::Hold,
        }
    }
}
