//! Price candle representation.

use chrono::NaiveDateTime;

/// One fixed-interval OHLCV bar. Candle series are ordered oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Sort ascending by timestamp. Stable, so duplicate timestamps keep their
/// input order and the later entry ends up at the higher index.
pub fn sort_candles(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.timestamp);
}
