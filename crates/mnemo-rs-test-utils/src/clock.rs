use chrono::{DateTime, Duration, TimeZone, Utc};
use mnemo_rs_memory::Clock;
use parking_lot::Mutex;

/// Clock under test control.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl FixedClock {
    /// Always reads `now` until moved.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            step: Duration::zero(),
        }
    }

    /// Starts at 2026-01-01T00:00:00Z and advances one second per reading.
    pub fn stepping() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start time");
        Self {
            now: Mutex::new(start - Duration::seconds(1)),
            step: Duration::seconds(1),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock();
        *now += self.step;
        *now
    }
}
