//! Wall-clock adapter.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

use crate::domain::shutdown::ShutdownSignal;
use crate::ports::clock_port::Clock;

const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Local time, with sleeps that end early once `shutdown` is triggered.
#[derive(Debug, Clone)]
pub struct SystemClock {
    shutdown: ShutdownSignal,
}

impl SystemClock {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self { shutdown }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.shutdown.is_triggered() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_returns_immediately_after_shutdown() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        let clock = SystemClock::new(shutdown);
        let start = Instant::now();
        clock.sleep(Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn short_sleep_waits() {
        let clock = SystemClock::new(ShutdownSignal::new());
        let start = Instant::now();
        clock.sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
