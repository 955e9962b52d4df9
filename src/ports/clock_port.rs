//! Clock port trait.

use chrono::{NaiveDateTime, NaiveTime};
use std::time::Duration;

/// Wall clock and blocking wait, injected so time-dependent behavior is testable.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }

    fn sleep(&self, duration: Duration);
}
