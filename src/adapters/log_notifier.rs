//! Notification sink that writes alerts to the log.

use tracing::info;

use crate::domain::error::CoinbotError;
use crate::ports::notification_port::NotificationSink;

/// Emits every alert as an `info` event under the `notification` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn send(&self, message: &str) -> Result<(), CoinbotError> {
        info!(target: "notification", "{message}");
        Ok(())
    }
}
