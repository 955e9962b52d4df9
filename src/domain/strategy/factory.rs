//! Strategy selection by name.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::CoinbotError;
use crate::domain::strategy::percentage::{DEFAULT_BUY_PCT, DEFAULT_SELL_PCT};
use crate::domain::strategy::rsi::{DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD};
use crate::domain::strategy::volatility_breakout::DEFAULT_K;
use crate::domain::strategy::{
    BollingerStrategy, CombinedStrategy, MaCrossStrategy, MacdStrategy, PercentageStrategy,
    RsiStrategy, Strategy, VolatilityBreakoutStrategy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    MaCross,
    Rsi,
    Macd,
    Bollinger,
    VolatilityBreakout,
    Percentage,
    Combined,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::MaCross,
        StrategyKind::Rsi,
        StrategyKind::Macd,
        StrategyKind::Bollinger,
        StrategyKind::VolatilityBreakout,
        StrategyKind::Percentage,
        StrategyKind::Combined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MaCross => "ma",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Macd => "macd",
            StrategyKind::Bollinger => "bb",
            StrategyKind::VolatilityBreakout => "volatility",
            StrategyKind::Percentage => "percentage",
            StrategyKind::Combined => "combined",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = CoinbotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| CoinbotError::UnknownStrategy {
                name: s.trim().to_string(),
            })
    }
}

/// Tunables shared by the strategy constructors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub k: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub buy_pct: f64,
    pub sell_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            rsi_oversold: DEFAULT_OVERSOLD,
            rsi_overbought: DEFAULT_OVERBOUGHT,
            buy_pct: DEFAULT_BUY_PCT,
            sell_pct: DEFAULT_SELL_PCT,
        }
    }
}

pub fn build_strategy(kind: StrategyKind, params: &StrategyParams) -> Box<dyn Strategy> {
    let rsi = RsiStrategy::new(params.rsi_oversold, params.rsi_overbought);
    match kind {
        StrategyKind::MaCross => Box::new(MaCrossStrategy),
        StrategyKind::Rsi => Box::new(rsi),
        StrategyKind::Macd => Box::new(MacdStrategy),
        StrategyKind::Bollinger => Box::new(BollingerStrategy),
        StrategyKind::VolatilityBreakout => Box::new(VolatilityBreakoutStrategy::new(params.k)),
        StrategyKind::Percentage => Box::new(PercentageStrategy::new(
            params.buy_pct,
            params.sell_pct,
            params.k,
        )),
        StrategyKind::Combined => Box::new(CombinedStrategy::new(
            rsi,
            VolatilityBreakoutStrategy::new(params.k),
        )),
    }
}
