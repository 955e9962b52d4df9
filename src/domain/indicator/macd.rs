//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three averages are running EMAs seeded with their first input.
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: slow - 1 + signal - 1 candles (33 for defaults).

use crate::domain::candle::Candle;
use crate::domain::indicator::ema::ema_of;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    candles: &[Candle],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema_fast = ema_of(&closes, fast);
    let ema_slow = ema_of(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_of(&macd_line, signal_period);

    let warmup = fast.max(slow) - 1 + signal_period - 1;

    let values = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let line = macd_line[i];
            let signal = signal_line[i];
            IndicatorPoint {
                timestamp: candle.timestamp,
                valid: i >= warmup,
                value: IndicatorValue::Macd {
                    line,
                    signal,
                    histogram: line - signal,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(candles: &[Candle]) -> IndicatorSeries {
    calculate_macd(candles, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_candles;

    fn rising(n: usize) -> Vec<Candle> {
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_candles(&prices)
    }

    #[test]
    fn macd_warmup_default() {
        let series = calculate_macd_default(&rising(40));

        let warmup = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        assert_eq!(warmup, 33);
        for i in 0..warmup {
            assert!(!series.values[i].valid, "Index {} should not be valid", i);
        }
        assert!(series.values[warmup].valid);
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let series = calculate_macd_default(&rising(40));

        for point in &series.values {
            if let IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } = point.value
            {
                assert!((histogram - (line - signal)).abs() < f64::EPSILON);
            } else {
                panic!("Expected Macd value");
            }
        }
    }

    #[test]
    fn macd_first_point_is_zero() {
        let series = calculate_macd_default(&rising(5));
        if let IndicatorValue::Macd { line, signal, .. } = series.values[0].value {
            assert!(line.abs() < f64::EPSILON);
            assert!(signal.abs() < f64::EPSILON);
        } else {
            panic!("Expected Macd value");
        }
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let series = calculate_macd_default(&rising(40));
        if let IndicatorValue::Macd { line, .. } = series.values[39].value {
            assert!(line > 0.0);
        } else {
            panic!("Expected Macd value");
        }
    }

    #[test]
    fn macd_constant_prices_is_zero() {
        let candles = make_candles(&[100.0; 40]);
        let series = calculate_macd_default(&candles);
        if let IndicatorValue::Macd {
            line,
            signal,
            histogram,
        } = series.values[39].value
        {
            assert!(line.abs() < 1e-12);
            assert!(signal.abs() < 1e-12);
            assert!(histogram.abs() < 1e-12);
        } else {
            panic!("Expected Macd value");
        }
    }

    #[test]
    fn macd_indicator_type() {
        let series = calculate_macd(&rising(3), 12, 26, 9);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
    }
}
