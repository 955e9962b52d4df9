//! Standard Deviation indicator.
//!
//! Sample standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n - 1))
//! Warmup: first (n-1) candles are invalid. A period below 2 is never valid.

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub fn calculate_stddev(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let warmup = period.saturating_sub(1);

    for (i, candle) in candles.iter().enumerate() {
        let valid = period >= 2 && i >= warmup;

        let value = if valid {
            sample_stddev(&candles[i + 1 - period..=i])
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
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}

/// Mean and sample standard deviation of the window's closes.
pub(crate) fn mean_and_sample_stddev(window: &[Candle]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().map(|c| c.close).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|c| {
            let diff = c.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    (mean, variance.sqrt())
}

fn sample_stddev(window: &[Candle]) -> f64 {
    mean_and_sample_stddev(window).1
}
