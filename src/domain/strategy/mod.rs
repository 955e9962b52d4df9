//! Signal-generating strategies.
//!
//! Every strategy maps a [`SignalContext`] (indicator snapshot plus live
//! price, average buy price and wall-clock time) to a [`Signal`]. Only the
//! volatility-breakout family keeps state between calls, which is why
//! `generate_signal` takes `&mut self`.

pub mod bollinger;
pub mod combined;
pub mod factory;
pub mod ma_cross;
pub mod macd;
pub mod percentage;
pub mod rsi;
pub mod volatility_breakout;

pub use bollinger::BollingerStrategy;
pub use combined::CombinedStrategy;
pub use factory::{build_strategy, StrategyKind, StrategyParams};
pub use ma_cross::MaCrossStrategy;
pub use macd::MacdStrategy;
pub use percentage::PercentageStrategy;
pub use rsi::RsiStrategy;
pub use volatility_breakout::{TargetState, VolatilityBreakoutStrategy};

use crate::domain::analysis::IndicatorSnapshot;
use crate::domain::signal::Signal;
use chrono::NaiveTime;

/// Candle granularity a strategy wants in live trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleInterval {
    Daily,
    Minutes(u32),
}

/// Everything a strategy may consult for one decision.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub snapshot: &'a IndicatorSnapshot<'a>,
    pub current_price: f64,
    /// Average entry price of the held position, `None` when flat.
    pub avg_buy_price: Option<f64>,
    pub current_time: NaiveTime,
}

impl<'a> SignalContext<'a> {
    /// Context priced at the snapshot's close with no position held.
    pub fn new(snapshot: &'a IndicatorSnapshot<'a>, current_time: NaiveTime) -> Self {
        Self {
            snapshot,
            current_price: snapshot.current_price,
            avg_buy_price: None,
            current_time,
        }
    }

    pub fn with_price(mut self, current_price: f64) -> Self {
        self.current_price = current_price;
        self
    }

    pub fn with_avg_buy_price(mut self, avg_buy_price: Option<f64>) -> Self {
        self.avg_buy_price = avg_buy_price;
        self
    }
}

pub trait Strategy {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    fn interval(&self) -> CandleInterval {
        CandleInterval::Minutes(15)
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal;
}
