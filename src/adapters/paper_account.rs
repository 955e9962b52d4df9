//! Simulated account for paper trading.
//!
//! Market orders fill immediately at the latest close the market data
//! source reports (1-minute candles, else 15-minute, else daily). The fee is
//! taken from the quote side of every fill.

use std::cell::RefCell;
use std::collections::BTreeMap;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::error::CoinbotError;
use crate::domain::position::{base_currency, quote_currency, AccountBalance};
use crate::ports::account_port::{AccountService, OrderResult, OrderSide, OrderState, OrderStatus};
use crate::ports::market_data_port::MarketDataSource;

const PRICE_MINUTE_UNITS: [u32; 2] = [1, 15];

#[derive(Debug, Clone, Copy, Default)]
struct Holding {
    balance: Decimal,
    avg_buy_price: Decimal,
}

#[derive(Debug, Default)]
struct Book {
    holdings: BTreeMap<String, Holding>,
    orders: BTreeMap<String, OrderStatus>,
    next_order: u64,
}

impl Book {
    fn holding_mut(&mut self, currency: &str) -> &mut Holding {
        self.holdings.entry(currency.to_string()).or_default()
    }

    fn record(&mut self, executed_volume: Decimal, paid_fee: Decimal) -> String {
        self.next_order += 1;
        let uuid = format!("paper-{:06}", self.next_order);
        self.orders.insert(
            uuid.clone(),
            OrderStatus {
                uuid: uuid.clone(),
                state: OrderState::Done,
                executed_volume,
                paid_fee,
            },
        );
        uuid
    }
}

pub struct PaperAccount<'a> {
    market_data: &'a dyn MarketDataSource,
    fee_rate: Decimal,
    book: RefCell<Book>,
}

impl<'a> PaperAccount<'a> {
    /// An account holding only `initial_krw` of cash.
    pub fn new(market_data: &'a dyn MarketDataSource, initial_krw: Decimal, fee_rate: Decimal) -> Self {
        let mut book = Book::default();
        book.holding_mut("KRW").balance = initial_krw;
        Self {
            market_data,
            fee_rate,
            book: RefCell::new(book),
        }
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    fn fill_price(&self, market: &str) -> Result<Decimal, CoinbotError> {
        let latest = PRICE_MINUTE_UNITS
            .iter()
            .find_map(|&unit| {
                self.market_data
                    .get_minute_candles(market, unit, 1)
                    .ok()
                    .and_then(|c| c.last().map(|c| c.close))
            })
            .or_else(|| {
                self.market_data
                    .get_day_candles(market, 1)
                    .ok()
                    .and_then(|c| c.last().map(|c| c.close))
            });

        latest
            .and_then(Decimal::from_f64)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| rejected(market, "no price available"))
    }
}

fn rejected(market: &str, reason: &str) -> CoinbotError {
    CoinbotError::OrderExecution {
        market: market.to_string(),
        reason: reason.to_string(),
    }
}

impl AccountService for PaperAccount<'_> {
    fn get_accounts(&self) -> Result<Vec<AccountBalance>, CoinbotError> {
        Ok(self
            .book
            .borrow()
            .holdings
            .iter()
            .map(|(currency, h)| AccountBalance {
                currency: currency.clone(),
                balance: h.balance,
                locked: Decimal::ZERO,
                avg_buy_price: h.avg_buy_price,
            })
            .collect())
    }

    fn buy_market_order(&self, market: &str, krw_amount: Decimal) -> Result<OrderResult, CoinbotError> {
        if krw_amount <= Decimal::ZERO {
            return Err(rejected(market, "order amount must be positive"));
        }
        let price = self.fill_price(market)?;

        let mut book = self.book.borrow_mut();
        let cash = book.holding_mut(quote_currency(market));
        if cash.balance < krw_amount {
            return Err(rejected(market, "insufficient quote balance"));
        }
        cash.balance -= krw_amount;

        let fee = krw_amount * self.fee_rate;
        let volume = (krw_amount - fee) / price;

        let coin = book.holding_mut(base_currency(market));
        let total = coin.balance + volume;
        coin.avg_buy_price = (coin.balance * coin.avg_buy_price + volume * price) / total;
        coin.balance = total;

        let uuid = book.record(volume, fee);
        info!(%market, %uuid, %volume, %price, %fee, "paper buy filled");
        Ok(OrderResult {
            uuid,
            market: market.to_string(),
            side: OrderSide::Bid,
        })
    }

    fn sell_market_order(&self, market: &str, volume: Decimal) -> Result<OrderResult, CoinbotError> {
        if volume <= Decimal::ZERO {
            return Err(rejected(market, "order volume must be positive"));
        }
        let price = self.fill_price(market)?;

        let mut book = self.book.borrow_mut();
        let coin = book.holding_mut(base_currency(market));
        if coin.balance < volume {
            return Err(rejected(market, "insufficient base balance"));
        }
        coin.balance -= volume;
        if coin.balance.is_zero() {
            coin.avg_buy_price = Decimal::ZERO;
        }

        let proceeds = volume * price;
        let fee = proceeds * self.fee_rate;
        book.holding_mut(quote_currency(market)).balance += proceeds - fee;

        let uuid = book.record(volume, fee);
        info!(%market, %uuid, %volume, %price, %fee, "paper sell filled");
        Ok(OrderResult {
            uuid,
            market: market.to_string(),
            side: OrderSide::Ask,
        })
    }

    fn get_order(&self, uuid: &str) -> Result<OrderStatus, CoinbotError> {
        debug!(uuid, "order lookup");
        self.book
            .borrow()
            .orders
            .get(uuid)
            .cloned()
            .ok_or_else(|| CoinbotError::Exchange {
                reason: format!("order not found: {uuid}"),
            })
    }
}
