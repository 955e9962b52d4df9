//! Account balances and the held position derived from them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One currency row of an account snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalance {
    pub currency: String,
    pub balance: Decimal,
    pub locked: Decimal,
    pub avg_buy_price: Decimal,
}

/// Holding in one market. Never stored across restarts: always rebuilt from
/// the latest account snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub has_position: bool,
    pub volume: Decimal,
    pub avg_buy_price: Decimal,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    /// Position in `market`'s base currency, flat unless its balance is positive.
    pub fn from_accounts(accounts: &[AccountBalance], market: &str) -> Self {
        let base = base_currency(market);
        accounts
            .iter()
            .find(|a| a.currency == base && a.balance > Decimal::ZERO)
            .map(|a| Position {
                has_position: true,
                volume: a.balance,
                avg_buy_price: a.avg_buy_price,
            })
            .unwrap_or_default()
    }

    /// Average buy price as handed to strategies: `None` when flat.
    pub fn avg_buy_price_f64(&self) -> Option<f64> {
        if self.has_position {
            self.avg_buy_price.to_f64()
        } else {
            None
        }
    }

    /// Percent gain of `price` over the average buy price.
    pub fn pnl_pct(&self, price: Decimal) -> Option<Decimal> {
        if !self.has_position || self.avg_buy_price.is_zero() {
            return None;
        }
        Some((price - self.avg_buy_price) / self.avg_buy_price * Decimal::ONE_HUNDRED)
    }
}

/// Free balance of `currency`, zero when the account has no such row.
pub fn available_balance(accounts: &[AccountBalance], currency: &str) -> Decimal {
    accounts
        .iter()
        .find(|a| a.currency == currency)
        .map(|a| a.balance)
        .unwrap_or(Decimal::ZERO)
}

/// "KRW" in "KRW-BTC".
pub fn quote_currency(market: &str) -> &str {
    market.split_once('-').map(|(q, _)| q).unwrap_or(market)
}

/// "BTC" in "KRW-BTC".
pub fn base_currency(market: &str) -> &str {
    market.split_once('-').map(|(_, b)| b).unwrap_or(market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(currency: &str, balance: Decimal, avg: Decimal) -> AccountBalance {
        AccountBalance {
            currency: currency.into(),
            balance,
            locked: Decimal::ZERO,
            avg_buy_price: avg,
        }
    }

    #[test]
    fn currencies_from_market() {
        assert_eq!(quote_currency("KRW-BTC"), "KRW");
        assert_eq!(base_currency("KRW-BTC"), "BTC");
        assert_eq!(base_currency("BTC"), "BTC");
    }

    #[test]
    fn position_from_base_currency_row() {
        let accounts = vec![
            row("KRW", dec!(500000), Decimal::ZERO),
            row("BTC", dec!(0.015), dec!(90000000)),
        ];
        let pos = Position::from_accounts(&accounts, "KRW-BTC");
        assert!(pos.has_position);
        assert_eq!(pos.volume, dec!(0.015));
        assert_eq!(pos.avg_buy_price, dec!(90000000));
        assert_eq!(pos.avg_buy_price_f64(), Some(90_000_000.0));
    }

    #[test]
    fn zero_balance_is_flat() {
        let accounts = vec![row("BTC", Decimal::ZERO, dec!(90000000))];
        let pos = Position::from_accounts(&accounts, "KRW-BTC");
        assert_eq!(pos, Position::flat());
        assert_eq!(pos.avg_buy_price_f64(), None);
    }

    #[test]
    fn other_coins_are_ignored() {
        let accounts = vec![row("ETH", dec!(1), dec!(4000000))];
        assert!(!Position::from_accounts(&accounts, "KRW-BTC").has_position);
    }

    #[test]
    fn available_balance_lookup() {
        let accounts = vec![row("KRW", dec!(123456.7), Decimal::ZERO)];
        assert_eq!(available_balance(&accounts, "KRW"), dec!(123456.7));
        assert_eq!(available_balance(&accounts, "USDT"), Decimal::ZERO);
    }

    #[test]
    fn pnl_pct_against_avg_price() {
        let pos = Position {
            has_position: true,
            volume: dec!(1),
            avg_buy_price: dec!(100),
        };
        assert_eq!(pos.pnl_pct(dec!(105)), Some(dec!(5)));
        assert_eq!(Position::flat().pnl_pct(dec!(105)), None);
    }
}
