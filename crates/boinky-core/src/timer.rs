use serde::{Deserialize, Serialize};

use crate::time::Millis;

/// An effect that lasts until an absolute epoch-ms instant (boost, tag
/// immunity, co-op invincibility). Active while `until > now`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    until: Millis,
}

impl Deadline {
    /// A deadline that has already expired.
    pub const EXPIRED: Deadline = Deadline { until: 0 };

    /// Restart the effect so it lasts `duration_ms` from `now`.
    pub fn start(&mut self, now: Millis, duration_ms: Millis) {
        self.until = now.saturating_add(duration_ms);
    }

    pub fn is_active(&self, now: Millis) -> bool {
        self.until > now
    }
}

/// Fixed-cadence gate for wall-clock driven effects (particle bursts,
/// animation frames). Fires at most once per `interval_ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    last: Millis,
}

impl Cadence {
    pub fn new(now: Millis) -> Self {
        Self { last: now }
    }

    /// Returns true and re-arms when at least `interval_ms` have elapsed.
    pub fn ready(&mut self, now: Millis, interval_ms: Millis) -> bool {
        if now.saturating_sub(self.last) >= interval_ms {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, now: Millis) {
        self.last = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_expires_at_boundary() {
        let mut d = Deadline::EXPIRED;
        assert!(!d.is_active(0));
        d.start(1_000, 2_000);
        assert!(d.is_active(1_000));
        assert!(d.is_active(2_999));
        assert!(!d.is_active(3_000), "deadline is exclusive at `until`");
    }

    #[test]
    fn restart_extends_from_now() {
        let mut d = Deadline::EXPIRED;
        d.start(0, 5_000);
        d.start(4_000, 8_000);
        assert!(d.is_active(11_999));
        assert!(!d.is_active(12_000));
    }

    #[test]
    fn cadence_fires_once_per_interval() {
        let mut c = Cadence::new(0);
        assert!(!c.ready(49, 50));
        assert!(c.ready(50, 50));
        assert!(!c.ready(60, 50));
        assert!(c.ready(100, 50));
    }
}
