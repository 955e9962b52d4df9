//! Alert throttling for the live loop.
//!
//! One cooldown covers every alert kind: after any successful send, all
//! alerts are suppressed until the cooldown has elapsed.

use chrono::NaiveDateTime;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NotificationThrottle {
    cooldown: Duration,
    last_sent: Option<NaiveDateTime>,
}

impl NotificationThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_sent: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_sent(&self) -> Option<NaiveDateTime> {
        self.last_sent
    }

    /// Whether an alert may go out at `now`.
    pub fn ready(&self, now: NaiveDateTime) -> bool {
        match self.last_sent {
            None => true,
            // a clock that moved backwards keeps the alert suppressed
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.cooldown),
        }
    }

    /// Start a new cooldown at `now`. Call only after a send succeeded.
    pub fn mark_sent(&mut self, now: NaiveDateTime) {
        self.last_sent = Some(now);
    }
}
