//! Live execution loop for one market and one strategy.
//!
//! Each cycle fetches candles, builds a snapshot, asks the strategy for a
//! signal and executes it against the account. The held position is only
//! ever replaced by a fresh account read after a confirmed order.

use std::time::Duration;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info, warn};

use crate::domain::analysis::analyze;
use crate::domain::candle::{sort_candles, Candle};
use crate::domain::error::CoinbotError;
use crate::domain::notification::NotificationThrottle;
use crate::domain::position::{available_balance, base_currency, quote_currency, Position};
use crate::domain::shutdown::ShutdownSignal;
use crate::domain::signal::Signal;
use crate::domain::strategy::{CandleInterval, SignalContext, Strategy};
use crate::ports::account_port::AccountService;
use crate::ports::clock_port::Clock;
use crate::ports::market_data_port::MarketDataSource;
use crate::ports::notification_port::NotificationSink;

#[derive(Debug, Clone, PartialEq)]
pub struct TraderConfig {
    pub market: String,
    /// Wait between cycles.
    pub interval: Duration,
    /// Share of the free quote balance spent per buy.
    pub buy_fraction: Decimal,
    pub min_order_krw: Decimal,
    /// Wait after a filled order before re-reading the account.
    pub settle_delay: Duration,
    /// Wait before retrying a cycle whose market data was unavailable.
    pub retry_backoff: Duration,
    pub notification_cooldown: Duration,
    pub day_candle_count: usize,
    /// Candle unit fetched for minute-interval strategies.
    pub minute_candle_unit: u32,
    pub minute_candle_count: usize,
}

impl TraderConfig {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            interval: Duration::from_secs(60),
            buy_fraction: dec!(0.3),
            min_order_krw: dec!(10000),
            settle_delay: Duration::from_secs(2),
            retry_backoff: Duration::from_secs(10),
            notification_cooldown: Duration::from_secs(3600),
            day_candle_count: 10,
            minute_candle_unit: 15,
            minute_candle_count: 120,
        }
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Candles could not be fetched or were too few; retry after the backoff.
    DataUnavailable,
    /// The signal was executed and the position refreshed.
    Traded(Signal),
    /// An actionable signal was dropped by a recoverable order failure.
    Skipped(Signal),
    /// Hold, or a signal that does not apply to the current position.
    Idle(Signal),
}

pub struct Trader<'a> {
    config: TraderConfig,
    strategy: Box<dyn Strategy + 'a>,
    market_data: &'a dyn MarketDataSource,
    account: &'a dyn AccountService,
    notifier: &'a dyn NotificationSink,
    clock: &'a dyn Clock,
    position: Position,
    throttle: NotificationThrottle,
}

impl<'a> Trader<'a> {
    /// Binds the loop to its collaborators and reads the starting position.
    pub fn new(
        config: TraderConfig,
        strategy: Box<dyn Strategy + 'a>,
        market_data: &'a dyn MarketDataSource,
        account: &'a dyn AccountService,
        notifier: &'a dyn NotificationSink,
        clock: &'a dyn Clock,
    ) -> Result<Self, CoinbotError> {
        let position = Position::from_accounts(&account.get_accounts()?, &config.market);
        let throttle = NotificationThrottle::new(config.notification_cooldown);
        Ok(Self {
            config,
            strategy,
            market_data,
            account,
            notifier,
            clock,
            position,
            throttle,
        })
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Runs cycles until `shutdown` is triggered or a fatal error occurs.
    /// The stop notification goes out on both paths.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<(), CoinbotError> {
        info!(
            market = %self.config.market,
            strategy = self.strategy.name(),
            "trading bot started"
        );
        self.notify(&format!(
            "Trading bot started - market: {}, strategy: {}",
            self.config.market,
            self.strategy.name()
        ));

        let result = self.run_until(shutdown);

        match &result {
            Ok(()) => {
                info!("shutdown requested");
                self.notify("Trading bot stopped by user");
            }
            Err(e) => {
                error!(error = %e, "trading bot failed");
                self.notify(&format!("Trading bot error: {e}"));
            }
        }

        info!("trading bot stopped");
        self.notify("Trading bot stopped");
        result
    }

    fn run_until(&mut self, shutdown: &ShutdownSignal) -> Result<(), CoinbotError> {
        while !shutdown.is_triggered() {
            match self.run_cycle()? {
                CycleOutcome::DataUnavailable => {
                    warn!(
                        backoff = ?self.config.retry_backoff,
                        "market data unavailable, retrying"
                    );
                    self.clock.sleep(self.config.retry_backoff);
                }
                _ => {
                    debug!(interval = ?self.config.interval, "waiting for next cycle");
                    self.clock.sleep(self.config.interval);
                }
            }
        }
        Ok(())
    }

    /// One fetch, analyze, decide, execute pass.
    ///
    /// Only unclassified errors are returned; data and order failures are
    /// logged, alerted and reported through the outcome.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, CoinbotError> {
        let candles = match self.fetch_candles() {
            Ok(candles) => candles,
            Err(e) => {
                error!(error = %e, "market analysis failed");
                self.notify(&format!("Market analysis error: {e}"));
                return Ok(CycleOutcome::DataUnavailable);
            }
        };

        let Some(snapshot) = analyze(&candles) else {
            let e = CoinbotError::InsufficientData {
                market: self.config.market.clone(),
                bars: candles.len(),
                minimum: 2,
            };
            error!(error = %e, "market analysis failed");
            self.notify(&format!("Market analysis error: {e}"));
            return Ok(CycleOutcome::DataUnavailable);
        };

        let price = snapshot.current_price;
        info!(
            price,
            rsi = snapshot.rsi,
            macd = snapshot.macd.macd,
            "market analyzed"
        );

        let ctx = SignalContext::new(&snapshot, self.clock.time_of_day())
            .with_avg_buy_price(self.position.avg_buy_price_f64());
        let signal = self.strategy.generate_signal(&ctx);
        info!(%signal, "signal generated");

        let result = match signal.clamp(self.position.has_position) {
            Signal::Buy => self.execute_buy(price),
            Signal::Sell => self.execute_sell(price),
            Signal::Hold => return Ok(CycleOutcome::Idle(signal)),
        };

        match result {
            Ok(()) => Ok(CycleOutcome::Traded(signal)),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, %signal, "trade skipped");
                self.notify(&format!("Trade skipped: {e}"));
                Ok(CycleOutcome::Skipped(signal))
            }
            Err(e) => Err(e),
        }
    }

    fn fetch_candles(&self) -> Result<Vec<Candle>, CoinbotError> {
        let market = &self.config.market;
        let mut candles = match self.strategy.interval() {
            CandleInterval::Daily => self
                .market_data
                .get_day_candles(market, self.config.day_candle_count)?,
            CandleInterval::Minutes(_) => self.market_data.get_minute_candles(
                market,
                self.config.minute_candle_unit,
                self.config.minute_candle_count,
            )?,
        };
        sort_candles(&mut candles);
        Ok(candles)
    }

    fn execute_buy(&mut self, price: f64) -> Result<(), CoinbotError> {
        let market = self.config.market.clone();
        let accounts = self.account.get_accounts()?;
        let available = available_balance(&accounts, quote_currency(&market));

        if available < self.config.min_order_krw {
            return Err(CoinbotError::InsufficientFunds {
                available,
                minimum: self.config.min_order_krw,
            });
        }

        let amount = available * self.config.buy_fraction;
        info!(%market, %amount, price, "placing market buy");
        let order = self
            .account
            .buy_market_order(&market, amount)
            .map_err(|e| order_error(&market, e))?;
        info!(uuid = %order.uuid, "market buy accepted");

        self.notify(&format!(
            "BUY filled: {market} - {} KRW (price: {price:.0} KRW)",
            amount.round_dp(0)
        ));
        self.settle_and_refresh()
    }

    fn execute_sell(&mut self, price: f64) -> Result<(), CoinbotError> {
        let market = self.config.market.clone();
        let volume = self.position.volume;
        let pnl_pct = Decimal::from_f64(price)
            .and_then(|p| self.position.pnl_pct(p))
            .map(|p| p.round_dp(2));

        info!(
            %market,
            %volume,
            price,
            pnl_pct = ?pnl_pct,
            "placing market sell"
        );
        let order = self
            .account
            .sell_market_order(&market, volume)
            .map_err(|e| order_error(&market, e))?;
        info!(uuid = %order.uuid, "market sell accepted");

        let pnl = pnl_pct.map_or_else(|| "n/a".to_string(), |p| format!("{p}%"));
        self.notify(&format!(
            "SELL filled: {market} - {volume} {} (price: {price:.0} KRW, P&L: {pnl})",
            base_currency(&market)
        ));
        self.settle_and_refresh()
    }

    fn settle_and_refresh(&mut self) -> Result<(), CoinbotError> {
        self.clock.sleep(self.config.settle_delay);
        let accounts = self.account.get_accounts()?;
        self.position = Position::from_accounts(&accounts, &self.config.market);
        info!(
            has_position = self.position.has_position,
            volume = %self.position.volume,
            avg_buy_price = %self.position.avg_buy_price,
            "position updated"
        );
        Ok(())
    }

    /// Best-effort alert through the shared cooldown.
    fn notify(&mut self, message: &str) {
        let now = self.clock.now();
        if !self.throttle.ready(now) {
            debug!(message, "notification suppressed by cooldown");
            return;
        }
        match self.notifier.send(message) {
            Ok(()) => self.throttle.mark_sent(now),
            Err(e) => warn!(error = %e, "notification delivery failed"),
        }
    }
}

fn order_error(market: &str, err: CoinbotError) -> CoinbotError {
    match err {
        CoinbotError::OrderExecution { .. } => err,
        other => CoinbotError::OrderExecution {
            market: market.to_string(),
            reason: other.to_string(),
        },
    }
}
