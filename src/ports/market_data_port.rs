//! Market data port trait.

use crate::domain::candle::Candle;
use crate::domain::error::CoinbotError;

/// Source of recent candles for one market. Implementations may return
/// candles in any order; callers sort before use.
pub trait MarketDataSource {
    fn get_minute_candles(
        &self,
        market: &str,
        unit_minutes: u32,
        count: usize,
    ) -> Result<Vec<Candle>, CoinbotError>;

    fn get_day_candles(&self, market: &str, count: usize) -> Result<Vec<Candle>, CoinbotError>;
}
