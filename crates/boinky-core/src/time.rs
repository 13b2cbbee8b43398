use std::cell::Cell;

/// Wall-clock milliseconds since the Unix epoch.
pub type Millis = u64;

/// Source of the current time. The simulation never reads the system clock
/// directly so that every timed rule can be driven from tests.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        let dur = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        dur.as_millis() as Millis
    }
}

/// Manually advanced clock for tests and scripted runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Returns the current system time in epoch milliseconds.
pub fn timestamp_now() -> Millis {
    SystemClock.now_ms()
}
