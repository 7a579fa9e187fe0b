use agora_core::Timestamp;
use agora_ports::Clock;
use chrono::{Duration, Utc};
use std::sync::RwLock;

/// Frozen clock that only moves when explicitly advanced
///
/// Auction end times and listing timestamps become deterministic: tests set
/// an initial time, run operations, then `advance` past the end time to
/// exercise expiry paths without sleeping.
pub struct ManualClock {
    current: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a clock frozen at the given time
    pub fn new(initial: Timestamp) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Create a clock frozen at the current wall time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.write().expect("clock lock poisoned");
        *current = *current + duration;
    }

    /// Jump the clock to an absolute time
    pub fn set(&self, time: Timestamp) {
        let mut current = self.current.write().expect("clock lock poisoned");
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read().expect("clock lock poisoned")
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_until_advanced() {
        let clock = ManualClock::starting_now();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), t0 + Duration::hours(2));
    }

    #[test]
    fn set_jumps_to_absolute_time() {
        let clock = ManualClock::starting_now();
        let target = clock.now() + Duration::days(7);
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
