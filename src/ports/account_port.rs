//! Brokerage account port trait.

use rust_decimal::Decimal;

use crate::domain::error::CoinbotError;
use crate::domain::position::AccountBalance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Bid,
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Wait,
    Done,
    Cancel,
}

/// Exchange acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub uuid: String,
    pub market: String,
    pub side: OrderSide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatus {
    pub uuid: String,
    pub state: OrderState,
    pub executed_volume: Decimal,
    pub paid_fee: Decimal,
}

pub trait AccountService {
    fn get_accounts(&self) -> Result<Vec<AccountBalance>, CoinbotError>;

    /// Market buy spending `krw_amount` of the quote currency.
    fn buy_market_order(&self, market: &str, krw_amount: Decimal) -> Result<OrderResult, CoinbotError>;

    /// Market sell of `volume` units of the base currency.
    fn sell_market_order(&self, market: &str, volume: Decimal) -> Result<OrderResult, CoinbotError>;

    fn get_order(&self, uuid: &str) -> Result<OrderStatus, CoinbotError>;
}
