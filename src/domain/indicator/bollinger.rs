//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1), the same
//! value `calculate_stddev` reports.
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) candles are invalid.

use crate::domain::candle::Candle;
use crate::domain::indicator::stddev::mean_and_sample_stddev;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    candles: &[Candle],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(candles.len());
    let warmup = period.saturating_sub(1);
    let mult = stddev_mult_x100 as f64 / 100.0;

    for (i, candle) in candles.iter().enumerate() {
        let valid = period >= 2 && i >= warmup;

        let (upper, middle, lower) = if valid {
            let (middle, stddev) = mean_and_sample_stddev(&candles[i + 1 - period..=i]);
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: candle.timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_candles;

    fn bands(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            } => (upper, middle, lower),
            _ => panic!("Expected Bollinger value"),
        }
    }

    #[test]
    fn bollinger_warmup() {
        let candles = make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&candles, 3, 200);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn bollinger_constant_values() {
        let candles = make_candles(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let series = calculate_bollinger(&candles, 3, 200);

        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 100.0).abs() < f64::EPSILON);
        assert!((upper - 100.0).abs() < f64::EPSILON);
        assert!((lower - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&candles, 3, 200);

        // sample stddev of 10, 20, 30 is exactly 10
        let (upper, middle, lower) = bands(&series, 2);
        assert!((middle - 20.0).abs() < 1e-10);
        assert!((upper - 40.0).abs() < 1e-10);
        assert!((lower - 0.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&candles, 3, 150);

        let (upper, _, lower) = bands(&series, 2);
        assert!((upper - 35.0).abs() < 1e-10);
        assert!((lower - 5.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_matches_stddev_series() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
        let candles = make_candles(&prices);
        let boll = calculate_bollinger(&candles, DEFAULT_PERIOD, DEFAULT_MULT_X100);
        let std = crate::domain::indicator::calculate_stddev(&candles, DEFAULT_PERIOD);

        for i in 19..30 {
            let (upper, middle, _) = bands(&boll, i);
            let s = std.simple_at(i).unwrap();
            assert!((upper - middle - 2.0 * s).abs() < 1e-9);
        }
    }

    #[test]
    fn bollinger_indicator_type() {
        let candles = make_candles(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&candles, 20, 200);

        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
        );
    }
}
