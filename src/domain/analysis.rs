//! Indicator engine: the full indicator set over one candle series, and the
//! snapshot strategies read as of a given bar.

use crate::domain::candle::Candle;
use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma,
    calculate_stddev, macd, rsi, IndicatorSeries, IndicatorValue,
};

/// Price-versus-moving-average relations as of one bar. Any comparison
/// against a moving average still in warmup is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaTrend {
    pub above_ma5: bool,
    pub above_ma20: bool,
    pub above_ma60: bool,
    pub ma5_above_ma20: bool,
    pub ma20_above_ma60: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdState {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    /// MACD crossed above its signal line on this bar.
    pub bullish_crossover: bool,
    /// MACD crossed below its signal line on this bar.
    pub bearish_crossover: bool,
}

/// Derived indicator state as of the last candle in `candles`.
///
/// Values still in warmup are `NaN`, so threshold comparisons on them are
/// always false and cannot produce a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot<'a> {
    pub current_price: f64,
    /// Close minus the previous close.
    pub price_change: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub ma120: f64,
    pub ma_trend: MaTrend,
    pub upper_band: f64,
    pub lower_band: f64,
    /// 0 at the lower band, 1 at the upper band, may leave [0, 1].
    pub bb_position: f64,
    pub rsi: f64,
    pub macd: MacdState,
    /// The series this snapshot was taken from, ending at the snapshot bar.
    pub candles: &'a [Candle],
}

/// Every indicator the strategies consume, computed once over a series.
#[derive(Debug, Clone)]
pub struct IndicatorFrame<'a> {
    candles: &'a [Candle],
    pub ma5: IndicatorSeries,
    pub ma10: IndicatorSeries,
    pub ma20: IndicatorSeries,
    pub ma60: IndicatorSeries,
    pub ma120: IndicatorSeries,
    pub stddev20: IndicatorSeries,
    pub bollinger: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd: IndicatorSeries,
}

impl<'a> IndicatorFrame<'a> {
    pub fn compute(candles: &'a [Candle]) -> Self {
        Self {
            candles,
            ma5: calculate_sma(candles, 5),
            ma10: calculate_sma(candles, 10),
            ma20: calculate_sma(candles, 20),
            ma60: calculate_sma(candles, 60),
            ma120: calculate_sma(candles, 120),
            stddev20: calculate_stddev(candles, bollinger::DEFAULT_PERIOD),
            bollinger: calculate_bollinger(
                candles,
                bollinger::DEFAULT_PERIOD,
                bollinger::DEFAULT_MULT_X100,
            ),
            rsi: calculate_rsi(candles, rsi::DEFAULT_PERIOD),
            macd: calculate_macd(
                candles,
                macd::DEFAULT_FAST,
                macd::DEFAULT_SLOW,
                macd::DEFAULT_SIGNAL,
            ),
        }
    }

    pub fn candles(&self) -> &'a [Candle] {
        self.candles
    }

    /// Snapshot as of the last candle.
    pub fn snapshot(&self) -> Option<IndicatorSnapshot<'a>> {
        self.snapshot_at(self.candles.len().checked_sub(1)?)
    }

    /// Snapshot as of `index`. Since every indicator is causal this is
    /// identical to computing a fresh frame over `candles[..=index]`.
    /// Needs a previous bar, so `index` must be at least 1.
    pub fn snapshot_at(&self, index: usize) -> Option<IndicatorSnapshot<'a>> {
        if index == 0 || index >= self.candles.len() {
            return None;
        }

        let price = self.candles[index].close;
        let prev_price = self.candles[index - 1].close;

        let ma5 = simple_or_nan(&self.ma5, index);
        let ma10 = simple_or_nan(&self.ma10, index);
        let ma20 = simple_or_nan(&self.ma20, index);
        let ma60 = simple_or_nan(&self.ma60, index);
        let ma120 = simple_or_nan(&self.ma120, index);

        let (upper_band, lower_band) = match self.bollinger.values.get(index) {
            Some(p) if p.valid => match p.value {
                IndicatorValue::Bollinger { upper, lower, .. } => (upper, lower),
                _ => (f64::NAN, f64::NAN),
            },
            _ => (f64::NAN, f64::NAN),
        };
        let width = upper_band - lower_band;
        let bb_position = if width > 0.0 {
            (price - lower_band) / width
        } else {
            f64::NAN
        };

        Some(IndicatorSnapshot {
            current_price: price,
            price_change: price - prev_price,
            ma5,
            ma10,
            ma20,
            ma60,
            ma120,
            ma_trend: MaTrend {
                above_ma5: price > ma5,
                above_ma20: price > ma20,
                above_ma60: price > ma60,
                ma5_above_ma20: ma5 > ma20,
                ma20_above_ma60: ma20 > ma60,
            },
            upper_band,
            lower_band,
            bb_position,
            rsi: simple_or_nan(&self.rsi, index),
            macd: self.macd_state(index),
            candles: &self.candles[..=index],
        })
    }

    fn macd_state(&self, index: usize) -> MacdState {
        let cur = macd_at(&self.macd, index);
        let prev = macd_at(&self.macd, index - 1);

        let (macd, signal, histogram) = cur.unwrap_or((f64::NAN, f64::NAN, f64::NAN));
        let (bullish_crossover, bearish_crossover) = match (prev, cur) {
            (Some((pl, ps, _)), Some((cl, cs, _))) => (pl < ps && cl > cs, pl > ps && cl < cs),
            _ => (false, false),
        };

        MacdState {
            macd,
            signal,
            histogram,
            bullish_crossover,
            bearish_crossover,
        }
    }
}

/// Indicator snapshot as of the last candle, or `None` with fewer than two candles.
pub fn analyze(candles: &[Candle]) -> Option<IndicatorSnapshot<'_>> {
    IndicatorFrame::compute(candles).snapshot()
}

fn simple_or_nan(series: &IndicatorSeries, index: usize) -> f64 {
    series.simple_at(index).unwrap_or(f64::NAN)
}

fn macd_at(series: &IndicatorSeries, index: usize) -> Option<(f64, f64, f64)> {
    match series.values.get(index) {
        Some(p) if p.valid => match p.value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => Some((line, signal, histogram)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_candles;

    fn prices(n: usize, f: impl Fn(usize) -> f64) -> Vec<f64> {
        (0..n).map(f).collect()
    }

    #[test]
    fn snapshot_needs_two_candles() {
        assert!(analyze(&[]).is_none());
        assert!(analyze(&make_candles(&[100.0])).is_none());
        assert!(analyze(&make_candles(&[100.0, 101.0])).is_some());
    }

    #[test]
    fn short_series_has_nan_indicators() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        let snap = analyze(&candles).unwrap();

        assert!((snap.current_price - 102.0).abs() < f64::EPSILON);
        assert!((snap.price_change - 1.0).abs() < f64::EPSILON);
        assert!(snap.ma5.is_nan());
        assert!(snap.rsi.is_nan());
        assert!(snap.bb_position.is_nan());
        assert!(snap.macd.macd.is_nan());
        assert_eq!(snap.ma_trend, MaTrend::default());
        assert!(!snap.macd.bullish_crossover);
        assert!(!snap.macd.bearish_crossover);
    }

    #[test]
    fn ma_trend_in_uptrend() {
        let candles = make_candles(&prices(70, |i| 100.0 + i as f64));
        let snap = analyze(&candles).unwrap();

        assert!(snap.ma_trend.above_ma5);
        assert!(snap.ma_trend.above_ma20);
        assert!(snap.ma_trend.above_ma60);
        assert!(snap.ma_trend.ma5_above_ma20);
        assert!(snap.ma_trend.ma20_above_ma60);
        assert!(snap.ma120.is_nan());
    }

    #[test]
    fn bb_position_at_middle_band_is_half() {
        // symmetric zig-zag ending on the mean
        let mut p = prices(20, |i| if i % 2 == 0 { 90.0 } else { 110.0 });
        p.push(100.0);
        let candles = make_candles(&p);
        let snap = analyze(&candles).unwrap();

        let middle = (snap.upper_band + snap.lower_band) / 2.0;
        let expected = (100.0 - snap.lower_band) / (snap.upper_band - snap.lower_band);
        assert!((snap.bb_position - expected).abs() < 1e-12);
        assert!(middle > 99.0 && middle < 101.0);
    }

    #[test]
    fn flat_series_has_nan_band_position() {
        let candles = make_candles(&[100.0; 25]);
        let snap = analyze(&candles).unwrap();
        assert!(snap.bb_position.is_nan());
    }

    #[test]
    fn snapshot_at_matches_prefix_computation() {
        let p = prices(60, |i| 100.0 + ((i * 13) % 17) as f64 - (i as f64) * 0.3);
        let candles = make_candles(&p);
        let frame = IndicatorFrame::compute(&candles);

        for i in [1, 10, 25, 40, 59] {
            let from_frame = frame.snapshot_at(i).unwrap();
            let from_prefix = analyze(&candles[..=i]).unwrap();
            assert_eq!(format!("{:?}", from_frame), format!("{:?}", from_prefix));
        }
    }

    #[test]
    fn snapshot_carries_prefix_candles() {
        let candles = make_candles(&prices(10, |i| i as f64 + 1.0));
        let frame = IndicatorFrame::compute(&candles);
        let snap = frame.snapshot_at(4).unwrap();
        assert_eq!(snap.candles.len(), 5);
        assert_eq!(snap.candles.last(), Some(&candles[4]));
    }

    #[test]
    fn macd_crossover_detected_once() {
        // long decline then a sharp rally turns MACD up through its signal
        let mut p = prices(40, |i| 200.0 - i as f64);
        p.extend(prices(10, |i| 161.0 + 6.0 * (i as f64 + 1.0)));
        let candles = make_candles(&p);
        let frame = IndicatorFrame::compute(&candles);

        let bullish: Vec<usize> = (34..candles.len())
            .filter(|&i| frame.snapshot_at(i).unwrap().macd.bullish_crossover)
            .collect();
        assert_eq!(bullish.len(), 1);
        let i = bullish[0];
        assert!(i >= 40);
        assert!(!frame.snapshot_at(i).unwrap().macd.bearish_crossover);
    }
}
