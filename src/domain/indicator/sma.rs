//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_sma(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let warmup = period.saturating_sub(1);

    for (i, candle) in candles.iter().enumerate() {
        let valid = period > 0 && i >= warmup;

        let value = if valid {
            let window = &candles[i + 1 - period..=i];
            window.iter().map(|c| c.close).sum::<f64>() / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid,
            value: IndicatorValue::Simple(value),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
