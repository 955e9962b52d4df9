//! Coin selector: grid search over markets and breakout k values.
//!
//! Works on daily candles already fetched by the caller, so it is a pure
//! function of its input.

use crate::domain::candle::Candle;
use crate::domain::strategy::volatility_breakout::breakout_target;

pub const DEFAULT_K_RANGE: [f64; 5] = [0.5, 0.6, 0.7, 0.8, 0.9];

pub const DEFAULT_LOOKBACK_DAYS: usize = 7;

pub const DEFAULT_MARKETS: [&str; 10] = [
    "KRW-BTC", "KRW-ETH", "KRW-XRP", "KRW-BCH", "KRW-EOS", "KRW-TRX", "KRW-ADA", "KRW-LTC",
    "KRW-LINK", "KRW-DOT",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub market: String,
    pub k: f64,
    /// Sum of fractional day returns, buying at the target and selling at the close.
    pub profit: f64,
}

/// Summed breakout return of `k` over ascending daily `candles`.
pub fn score_k(candles: &[Candle], k: f64) -> f64 {
    candles
        .windows(2)
        .filter_map(|pair| {
            let (previous, today) = (&pair[0], &pair[1]);
            let target = breakout_target(previous, today.open, k);
            (today.high >= target).then(|| (today.close - target) / target)
        })
        .sum()
}

/// Best `(market, k)` by [`score_k`]. Ties keep the earlier candidate.
/// Markets with fewer than two candles are skipped; `None` if nothing is scorable.
pub fn find_best_k_and_coin(markets: &[(String, Vec<Candle>)], k_range: &[f64]) -> Option<Selection> {
    let mut best: Option<Selection> = None;

    for (market, candles) in markets {
        if candles.len() < 2 {
            continue;
        }
        for &k in k_range {
            let profit = score_k(candles, k);
            if best.as_ref().is_none_or(|b| profit > b.profit) {
                best = Some(Selection {
                    market: market.clone(),
                    k,
                    profit,
                });
            }
        }
    }

    best
}
