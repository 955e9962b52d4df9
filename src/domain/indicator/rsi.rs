//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If both are 0 (flat prices): RSI is undefined and reported as NaN.
//!
//! Warmup: first n candles are invalid (need n price changes for the first average).

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(candles: &[Candle], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());

    if period == 0 {
        values.extend(candles.iter().map(invalid_point));
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i == 0 {
            values.push(invalid_point(candle));
            continue;
        }

        let change = candle.close - candles[i - 1].close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < period {
            sum_gain += gain;
            sum_loss += loss;
            values.push(invalid_point(candle));
            continue;
        }

        if i == period {
            avg_gain = (sum_gain + gain) / period as f64;
            avg_loss = (sum_loss + loss) / period as f64;
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid: true,
            value: IndicatorValue::Simple(rsi_value(avg_gain, avg_loss)),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 { 100.0 } else { f64::NAN }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

fn invalid_point(candle: &Candle) -> IndicatorPoint {
    IndicatorPoint {
        timestamp: candle.timestamp,
        valid: false,
        value: IndicatorValue::Simple(0.0),
    }
}
