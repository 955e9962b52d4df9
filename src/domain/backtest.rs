//! Backtest simulator: replays a candle series through one strategy.
//!
//! Position sizing is all-in/all-out and P&L is the plain sum of each
//! trade's fractional return, not compounded from trade to trade.
//!
//! Daily bars are replayed as two ticks: a rollover tick at 09:00 priced at
//! the open and judged on the previous bar's snapshot, then a session tick
//! priced at the close. At most one trade is executed per bar.

use chrono::NaiveTime;

use crate::domain::analysis::IndicatorFrame;
use crate::domain::candle::Candle;
use crate::domain::signal::Signal;
use crate::domain::strategy::volatility_breakout::{breakout_target, DAILY_RESET_START};
use crate::domain::strategy::{
    build_strategy, CandleInterval, SignalContext, Strategy, StrategyKind, StrategyParams,
};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;
pub const DEFAULT_WARMUP: usize = 20;

/// k used by the built-in breakout replay.
pub const REPLAY_BREAKOUT_K: f64 = 0.5;

/// Time of day of the session tick of a daily bar.
pub const DAILY_SESSION_TIME: NaiveTime = match NaiveTime::from_hms_opt(15, 0, 0) {
    Some(t) => t,
    None => panic!("invalid session time"),
};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// First bar index that is evaluated.
    pub warmup: usize,
    /// Wall-clock time handed to time-sensitive strategies, one tick per bar.
    /// `None` replays daily bars as rollover and session ticks and minute
    /// bars at their own time of day.
    pub clock_time: Option<NaiveTime>,
    /// Spacing of the replayed candles. `None` takes the strategy's own.
    pub candle_interval: Option<CandleInterval>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            warmup: DEFAULT_WARMUP,
            clock_time: None,
            candle_interval: None,
        }
    }
}

/// What drives the replay.
pub enum BacktestMode<'s> {
    /// Built-in daily breakout: enter at the target when the bar's high
    /// reaches it, exit at the following bar's open.
    VolatilityBreakout,
    /// Any strategy object, trading at each bar's close.
    Strategy(&'s mut dyn Strategy),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    /// One entry per input candle; Hold wherever no trade happened.
    pub signals: Vec<Signal>,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_return_pct: f64,
    pub buy_count: usize,
    /// Includes the forced close of a position still open after the last bar.
    pub sell_count: usize,
}

#[derive(Debug, Default)]
struct Ledger {
    in_position: bool,
    entry_price: f64,
    total_profit: f64,
    buy_count: usize,
    sell_count: usize,
}

impl Ledger {
    fn open(&mut self, price: f64) {
        self.in_position = true;
        self.entry_price = price;
        self.buy_count += 1;
    }

    fn close(&mut self, price: f64) {
        self.in_position = false;
        self.total_profit += (price - self.entry_price) / self.entry_price;
        self.sell_count += 1;
    }

    /// Executes `signal` at `price` after clamping it to the position.
    /// Returns what was executed.
    fn apply(&mut self, signal: Signal, price: f64) -> Signal {
        let executed = signal.clamp(self.in_position);
        match executed {
            Signal::Buy => self.open(price),
            Signal::Sell => self.close(price),
            Signal::Hold => {}
        }
        executed
    }

    fn avg_buy_price(&self) -> Option<f64> {
        self.in_position.then_some(self.entry_price)
    }
}

/// Replay `candles` (oldest first) from `config.warmup` onward.
///
/// Returns `None` when the series is not longer than the warmup.
pub fn run_backtest(
    candles: &[Candle],
    mode: BacktestMode<'_>,
    config: &BacktestConfig,
) -> Option<BacktestResult> {
    if candles.len() <= config.warmup {
        return None;
    }

    let mut signals = vec![Signal::Hold; candles.len()];
    let mut ledger = Ledger::default();

    match mode {
        BacktestMode::VolatilityBreakout => {
            replay_breakout(candles, config.warmup, &mut signals, &mut ledger)
        }
        BacktestMode::Strategy(strategy) => {
            replay_strategy(candles, strategy, config, &mut signals, &mut ledger)
        }
    }

    if ledger.in_position {
        if let Some(last) = candles.last() {
            ledger.close(last.close);
        }
    }

    let initial = config.initial_capital;
    let final_capital = initial * (1.0 + ledger.total_profit);

    Some(BacktestResult {
        signals,
        initial_capital: initial,
        final_capital,
        total_return_pct: (final_capital - initial) / initial * 100.0,
        buy_count: ledger.buy_count,
        sell_count: ledger.sell_count,
    })
}

fn replay_breakout(candles: &[Candle], warmup: usize, signals: &mut [Signal], ledger: &mut Ledger) {
    let last = candles.len() - 1;

    for i in warmup.max(1)..candles.len() {
        let today = &candles[i];
        let target = breakout_target(&candles[i - 1], today.open, REPLAY_BREAKOUT_K);

        if !ledger.in_position && today.high >= target {
            signals[i] = Signal::Buy;
            ledger.open(target);
        } else if ledger.in_position && i < last {
            signals[i] = Signal::Sell;
            ledger.close(candles[i + 1].open);
        }
    }
}

fn replay_strategy(
    candles: &[Candle],
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
    signals: &mut [Signal],
    ledger: &mut Ledger,
) {
    let frame = IndicatorFrame::compute(candles);
    let interval = config
        .candle_interval
        .unwrap_or_else(|| strategy.interval());
    let daily = config.clock_time.is_none() && interval == CandleInterval::Daily;

    for (i, candle) in candles.iter().enumerate().skip(config.warmup) {
        let mut executed = Signal::Hold;

        if daily && i > 0 {
            if let Some(previous) = frame.snapshot_at(i - 1) {
                let ctx = SignalContext::new(&previous, DAILY_RESET_START)
                    .with_price(candle.open)
                    .with_avg_buy_price(ledger.avg_buy_price());
                executed = ledger.apply(strategy.generate_signal(&ctx), candle.open);
            }
        }

        let Some(snapshot) = frame.snapshot_at(i) else {
            signals[i] = executed;
            continue;
        };

        let time = match config.clock_time {
            Some(t) => t,
            None if daily => DAILY_SESSION_TIME,
            None => candle.timestamp.time(),
        };
        let ctx = SignalContext::new(&snapshot, time)
            .with_price(candle.close)
            .with_avg_buy_price(ledger.avg_buy_price());
        // stateful strategies see the session tick even after a rollover trade
        let signal = strategy.generate_signal(&ctx);
        if executed == Signal::Hold {
            executed = ledger.apply(signal, candle.close);
        }
        signals[i] = executed;
    }
}

/// Backtest every strategy kind over the same candles, best return first.
pub fn compare_strategies(
    candles: &[Candle],
    config: &BacktestConfig,
    params: &StrategyParams,
) -> Vec<(StrategyKind, BacktestResult)> {
    let mut results: Vec<(StrategyKind, BacktestResult)> = StrategyKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let mut strategy = build_strategy(kind, params);
            run_backtest(candles, BacktestMode::Strategy(strategy.as_mut()), config)
                .map(|r| (kind, r))
        })
        .collect();

    results.sort_by(|a, b| b.1.total_return_pct.total_cmp(&a.1.total_return_pct));
    results
}
