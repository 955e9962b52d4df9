//! Domain error types.

use rust_decimal::Decimal;

/// Top-level error type for coinbot.
///
/// The live loop classifies these: [`CoinbotError::DataFetch`] is retried,
/// [`CoinbotError::InsufficientFunds`] and [`CoinbotError::OrderExecution`]
/// skip the current trade, [`CoinbotError::Notification`] is only logged.
/// Everything else is fatal to the loop.
#[derive(Debug, thiserror::Error)]
pub enum CoinbotError {
    #[error("failed to fetch market data for {market}: {reason}")]
    DataFetch { market: String, reason: String },

    #[error("insufficient funds: available {available} KRW, minimum order {minimum} KRW")]
    InsufficientFunds { available: Decimal, minimum: Decimal },

    #[error("order execution failed for {market}: {reason}")]
    OrderExecution { market: String, reason: String },

    #[error("notification delivery failed: {reason}")]
    Notification { reason: String },

    #[error("exchange error: {reason}")]
    Exchange { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("insufficient data for {market}: have {bars} candles, need {minimum}")]
    InsufficientData {
        market: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoinbotError {
    /// Errors the live loop survives without stopping.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoinbotError::DataFetch { .. }
                | CoinbotError::InsufficientFunds { .. }
                | CoinbotError::OrderExecution { .. }
                | CoinbotError::Notification { .. }
        )
    }
}

impl From<&CoinbotError> for std::process::ExitCode {
    fn from(err: &CoinbotError) -> Self {
        let code: u8 = match err {
            CoinbotError::Io(_) => 1,
            CoinbotError::ConfigParse { .. }
            | CoinbotError::ConfigMissing { .. }
            | CoinbotError::ConfigInvalid { .. } => 2,
            CoinbotError::DataFetch { .. }
            | CoinbotError::Exchange { .. }
            | CoinbotError::Notification { .. } => 3,
            CoinbotError::UnknownStrategy { .. } => 4,
            CoinbotError::InsufficientData { .. } => 5,
            CoinbotError::InsufficientFunds { .. } | CoinbotError::OrderExecution { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
