//! Typed settings read from a [`ConfigPort`], plus validation.
//!
//! Sections: `[trading]`, `[strategy]`, `[notification]`, `[backtest]`,
//! `[paper]`. Every key is optional and falls back to the built-in default;
//! malformed values are errors rather than silently defaulted.

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_WARMUP};
use crate::domain::error::CoinbotError;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::domain::trader::TraderConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_MARKET: &str = "KRW-BTC";
pub const DEFAULT_STRATEGY: &str = "combined";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    pub days: usize,
    pub warmup: usize,
    /// Directory holding candle CSV files.
    pub data_dir: PathBuf,
}

impl BacktestSettings {
    pub fn backtest_config(&self) -> BacktestConfig {
        BacktestConfig {
            initial_capital: self.initial_capital,
            warmup: self.warmup,
            clock_time: None,
            candle_interval: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperSettings {
    pub initial_krw: Decimal,
    pub fee_rate: Decimal,
}

pub fn strategy_kind(config: &dyn ConfigPort) -> Result<StrategyKind, CoinbotError> {
    config
        .get_string("trading", "strategy")
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string())
        .parse()
}

pub fn strategy_params(config: &dyn ConfigPort) -> StrategyParams {
    let d = StrategyParams::default();
    StrategyParams {
        k: config.get_double("strategy", "k", d.k),
        rsi_oversold: config.get_double("strategy", "rsi_oversold", d.rsi_oversold),
        rsi_overbought: config.get_double("strategy", "rsi_overbought", d.rsi_overbought),
        buy_pct: config.get_double("strategy", "buy_pct", d.buy_pct),
        sell_pct: config.get_double("strategy", "sell_pct", d.sell_pct),
    }
}

pub fn trader_config(config: &dyn ConfigPort) -> Result<TraderConfig, CoinbotError> {
    let market = config
        .get_string("trading", "market")
        .unwrap_or_else(|| DEFAULT_MARKET.to_string());
    let mut trader = TraderConfig::new(market);

    trader.interval = seconds(config, "trading", "interval", trader.interval)?;
    trader.buy_fraction = decimal(config, "trading", "buy_amount_pct", trader.buy_fraction)?;
    trader.min_order_krw = decimal(config, "trading", "min_order_krw", trader.min_order_krw)?;
    trader.minute_candle_unit = candle_unit(config, trader.minute_candle_unit)?;
    trader.notification_cooldown = seconds(
        config,
        "notification",
        "cooldown_secs",
        trader.notification_cooldown,
    )?;
    Ok(trader)
}

pub fn backtest_settings(config: &dyn ConfigPort) -> Result<BacktestSettings, CoinbotError> {
    Ok(BacktestSettings {
        initial_capital: config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        days: non_negative_int(config, "backtest", "days", 30)?,
        warmup: non_negative_int(config, "backtest", "warmup", DEFAULT_WARMUP)?,
        data_dir: config
            .get_string("backtest", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data")),
    })
}

pub fn paper_settings(config: &dyn ConfigPort) -> Result<PaperSettings, CoinbotError> {
    Ok(PaperSettings {
        initial_krw: decimal(config, "paper", "initial_krw", dec!(1000000))?,
        fee_rate: decimal(config, "paper", "fee_rate", dec!(0.0005))?,
    })
}

/// Check every section, reporting the first problem found.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), CoinbotError> {
    validate_trading(config)?;
    validate_strategy(config)?;
    validate_backtest(config)?;
    validate_paper(config)?;
    Ok(())
}

fn validate_trading(config: &dyn ConfigPort) -> Result<(), CoinbotError> {
    let trader = trader_config(config)?;
    strategy_kind(config)?;

    match trader.market.split_once('-') {
        Some((quote, base)) if !quote.is_empty() && !base.is_empty() => {}
        _ => {
            return Err(invalid(
                "trading",
                "market",
                "market must look like QUOTE-BASE, e.g. KRW-BTC",
            ))
        }
    }
    if trader.interval.is_zero() {
        return Err(invalid("trading", "interval", "interval must be positive"));
    }
    if trader.buy_fraction <= Decimal::ZERO || trader.buy_fraction > Decimal::ONE {
        return Err(invalid(
            "trading",
            "buy_amount_pct",
            "buy_amount_pct must be in (0, 1]",
        ));
    }
    if trader.min_order_krw <= Decimal::ZERO {
        return Err(invalid(
            "trading",
            "min_order_krw",
            "min_order_krw must be positive",
        ));
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), CoinbotError> {
    let p = strategy_params(config);

    if p.k <= 0.0 {
        return Err(invalid("strategy", "k", "k must be positive"));
    }
    if !(0.0..=100.0).contains(&p.rsi_oversold) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be between 0 and 100",
        ));
    }
    if !(0.0..=100.0).contains(&p.rsi_overbought) || p.rsi_overbought <= p.rsi_oversold {
        return Err(invalid(
            "strategy",
            "rsi_overbought",
            "rsi_overbought must be between rsi_oversold and 100",
        ));
    }
    if p.buy_pct <= 0.0 {
        return Err(invalid("strategy", "buy_pct", "buy_pct must be positive"));
    }
    if p.sell_pct <= 0.0 {
        return Err(invalid("strategy", "sell_pct", "sell_pct must be positive"));
    }
    Ok(())
}

fn validate_backtest(config: &dyn ConfigPort) -> Result<(), CoinbotError> {
    let b = backtest_settings(config)?;
    if b.initial_capital <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    if b.days == 0 {
        return Err(invalid("backtest", "days", "days must be at least 1"));
    }
    Ok(())
}

fn validate_paper(config: &dyn ConfigPort) -> Result<(), CoinbotError> {
    let p = paper_settings(config)?;
    if p.initial_krw <= Decimal::ZERO {
        return Err(invalid("paper", "initial_krw", "initial_krw must be positive"));
    }
    if p.fee_rate < Decimal::ZERO || p.fee_rate >= Decimal::ONE {
        return Err(invalid("paper", "fee_rate", "fee_rate must be in [0, 1)"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> CoinbotError {
    CoinbotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn decimal(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Decimal,
) -> Result<Decimal, CoinbotError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|e| invalid(section, key, &format!("not a decimal number: {e}"))),
    }
}

fn non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, CoinbotError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|_| invalid(section, key, "must be a non-negative integer")),
    }
}

/// Minute units the exchange serves candles in.
pub const MINUTE_CANDLE_UNITS: [u32; 8] = [1, 3, 5, 10, 15, 30, 60, 240];

fn candle_unit(config: &dyn ConfigPort, default: u32) -> Result<u32, CoinbotError> {
    let Some(s) = config.get_string("trading", "candle_unit") else {
        return Ok(default);
    };
    s.trim()
        .parse::<u32>()
        .ok()
        .filter(|unit| MINUTE_CANDLE_UNITS.contains(unit))
        .ok_or_else(|| {
            invalid(
                "trading",
                "candle_unit",
                "candle_unit must be one of 1, 3, 5, 10, 15, 30, 60, 240",
            )
        })
}

fn seconds(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Duration,
) -> Result<Duration, CoinbotError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid(section, key, "must be a whole number of seconds, >= 0")),
    }
}
