#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use coinbot::domain::candle::Candle;
use coinbot::domain::error::CoinbotError;
use coinbot::domain::position::{base_currency, quote_currency, AccountBalance};
use coinbot::domain::shutdown::ShutdownSignal;
use coinbot::domain::signal::Signal;
use coinbot::domain::strategy::{CandleInterval, SignalContext, Strategy};
use coinbot::ports::account_port::{AccountService, OrderResult, OrderSide, OrderState, OrderStatus};
use coinbot::ports::clock_port::Clock;
use coinbot::ports::market_data_port::MarketDataSource;
use coinbot::ports::notification_port::NotificationSink;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Flat candles (open = high = low = close), fifteen minutes apart.
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    let start = datetime(2024, 1, 1, 0, 0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: start + chrono::Duration::minutes(15 * i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect()
}

/// Daily candles at 09:00 from `(open, high, low, close)` tuples.
pub fn make_daily(bars: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
    let start = datetime(2024, 3, 1, 9, 0);
    bars.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            timestamp: start + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 10.0,
        })
        .collect()
}

/// Market data that serves whatever candles the test sets, or fails.
pub struct MockMarketData {
    pub minute: RefCell<Vec<Candle>>,
    pub day: RefCell<Vec<Candle>>,
    pub fail: Cell<bool>,
    pub fetches: Cell<usize>,
    /// Unit of every minute-candle request.
    pub minute_units: RefCell<Vec<u32>>,
}

impl MockMarketData {
    pub fn new(minute: Vec<Candle>) -> Self {
        Self {
            minute: RefCell::new(minute),
            day: RefCell::new(Vec::new()),
            fail: Cell::new(false),
            fetches: Cell::new(0),
            minute_units: RefCell::new(Vec::new()),
        }
    }

    pub fn with_day(self, day: Vec<Candle>) -> Self {
        *self.day.borrow_mut() = day;
        self
    }

    fn serve(&self, market: &str, candles: &RefCell<Vec<Candle>>, count: usize) -> Result<Vec<Candle>, CoinbotError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail.get() {
            return Err(CoinbotError::DataFetch {
                market: market.to_string(),
                reason: "connection reset".into(),
            });
        }
        let all = candles.borrow();
        let skip = all.len().saturating_sub(count);
        Ok(all[skip..].to_vec())
    }
}

impl MarketDataSource for MockMarketData {
    fn get_minute_candles(
        &self,
        market: &str,
        unit_minutes: u32,
        count: usize,
    ) -> Result<Vec<Candle>, CoinbotError> {
        self.minute_units.borrow_mut().push(unit_minutes);
        self.serve(market, &self.minute, count)
    }

    fn get_day_candles(&self, market: &str, count: usize) -> Result<Vec<Candle>, CoinbotError> {
        self.serve(market, &self.day, count)
    }
}

/// Account that fills market orders at `fill_price` and records them.
pub struct MockAccount {
    pub balances: RefCell<Vec<AccountBalance>>,
    pub orders: RefCell<Vec<(OrderSide, Decimal)>>,
    pub fill_price: Cell<Decimal>,
    pub fail_orders: Cell<bool>,
    pub fail_accounts: Cell<bool>,
}

impl MockAccount {
    pub fn with_krw(krw: Decimal) -> Self {
        Self {
            balances: RefCell::new(vec![balance("KRW", krw, Decimal::ZERO)]),
            orders: RefCell::new(Vec::new()),
            fill_price: Cell::new(Decimal::ONE_HUNDRED),
            fail_orders: Cell::new(false),
            fail_accounts: Cell::new(false),
        }
    }

    pub fn holding(self, currency: &str, volume: Decimal, avg_buy_price: Decimal) -> Self {
        self.balances
            .borrow_mut()
            .push(balance(currency, volume, avg_buy_price));
        self
    }

    pub fn balance_of(&self, currency: &str) -> Decimal {
        self.balances
            .borrow()
            .iter()
            .find(|b| b.currency == currency)
            .map(|b| b.balance)
            .unwrap_or(Decimal::ZERO)
    }

    fn adjust(&self, currency: &str, delta: Decimal, avg_buy_price: Option<Decimal>) {
        let mut balances = self.balances.borrow_mut();
        let row = match balances.iter().position(|b| b.currency == currency) {
            Some(i) => &mut balances[i],
            None => {
                balances.push(balance(currency, Decimal::ZERO, Decimal::ZERO));
                let last = balances.len() - 1;
                &mut balances[last]
            }
        };
        row.balance += delta;
        if let Some(avg) = avg_buy_price {
            row.avg_buy_price = avg;
        }
    }

    fn rejected(&self, market: &str) -> Option<CoinbotError> {
        self.fail_orders.get().then(|| CoinbotError::Exchange {
            reason: format!("order rejected for {market}"),
        })
    }

    fn ack(&self, market: &str, side: OrderSide) -> OrderResult {
        OrderResult {
            uuid: format!("mock-{}", self.orders.borrow().len()),
            market: market.to_string(),
            side,
        }
    }
}

pub fn balance(currency: &str, amount: Decimal, avg_buy_price: Decimal) -> AccountBalance {
    AccountBalance {
        currency: currency.to_string(),
        balance: amount,
        locked: Decimal::ZERO,
        avg_buy_price,
    }
}

impl AccountService for MockAccount {
    fn get_accounts(&self) -> Result<Vec<AccountBalance>, CoinbotError> {
        if self.fail_accounts.get() {
            return Err(CoinbotError::Exchange {
                reason: "401 unauthorized".into(),
            });
        }
        Ok(self.balances.borrow().clone())
    }

    fn buy_market_order(&self, market: &str, krw_amount: Decimal) -> Result<OrderResult, CoinbotError> {
        if let Some(e) = self.rejected(market) {
            return Err(e);
        }
        let price = self.fill_price.get();
        self.adjust(quote_currency(market), -krw_amount, None);
        self.adjust(base_currency(market), krw_amount / price, Some(price));
        self.orders.borrow_mut().push((OrderSide::Bid, krw_amount));
        Ok(self.ack(market, OrderSide::Bid))
    }

    fn sell_market_order(&self, market: &str, volume: Decimal) -> Result<OrderResult, CoinbotError> {
        if let Some(e) = self.rejected(market) {
            return Err(e);
        }
        let price = self.fill_price.get();
        self.adjust(base_currency(market), -volume, None);
        self.adjust(quote_currency(market), volume * price, None);
        self.orders.borrow_mut().push((OrderSide::Ask, volume));
        Ok(self.ack(market, OrderSide::Ask))
    }

    fn get_order(&self, uuid: &str) -> Result<OrderStatus, CoinbotError> {
        Ok(OrderStatus {
            uuid: uuid.to_string(),
            state: OrderState::Done,
            executed_volume: Decimal::ZERO,
            paid_fee: Decimal::ZERO,
        })
    }
}

/// Keeps every delivered message; can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
    pub fail: Cell<bool>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn send(&self, message: &str) -> Result<(), CoinbotError> {
        if self.fail.get() {
            return Err(CoinbotError::Notification {
                reason: "webhook down".into(),
            });
        }
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Clock that advances only when slept on. With `stop_after`, the given
/// signal is triggered once that many sleeps have happened.
pub struct FakeClock {
    pub now: Cell<NaiveDateTime>,
    pub sleeps: RefCell<Vec<Duration>>,
    pub stop_after: Option<(usize, ShutdownSignal)>,
}

impl FakeClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
            sleeps: RefCell::new(Vec::new()),
            stop_after: None,
        }
    }

    pub fn stopping_after(mut self, sleeps: usize, shutdown: ShutdownSignal) -> Self {
        self.stop_after = Some((sleeps, shutdown));
        self
    }

    pub fn advance(&self, by: Duration) {
        let by = chrono::Duration::from_std(by).unwrap();
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        let mut sleeps = self.sleeps.borrow_mut();
        sleeps.push(duration);
        if let Some((n, shutdown)) = &self.stop_after {
            if sleeps.len() >= *n {
                shutdown.trigger();
            }
        }
    }
}

/// Emits a fixed sequence of signals, then Hold forever.
pub struct ScriptedStrategy {
    pub script: VecDeque<Signal>,
    pub interval: CandleInterval,
    /// Shared with the test so it survives the strategy being boxed.
    pub seen_avg_buy_price: Rc<RefCell<Vec<Option<f64>>>>,
}

impl ScriptedStrategy {
    pub fn new(script: &[Signal]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            interval: CandleInterval::Minutes(15),
            seen_avg_buy_price: Rc::default(),
        }
    }
}

impl Strategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn interval(&self) -> CandleInterval {
        self.interval
    }

    fn generate_signal(&mut self, ctx: &SignalContext<'_>) -> Signal {
        self.seen_avg_buy_price.borrow_mut().push(ctx.avg_buy_price);
        self.script.pop_front().unwrap_or(Signal::Hold)
    }
}

pub fn dec_from(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap()
}
