//! Notification sink port trait.

use crate::domain::error::CoinbotError;

pub trait NotificationSink {
    /// Deliver one alert. Callers log failures and carry on.
    fn send(&self, message: &str) -> Result<(), CoinbotError>;
}
