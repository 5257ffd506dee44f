//! Monotonic-time rate limiter shared by every periodic activity in the loop.
//!
//! Timestamps are `u32` milliseconds that wrap; all differences are unsigned
//! wrapping differences, so a counter rollover does not stall or re-fire a gate.

/// Has at least `period_ms` elapsed since `last_fired`?
///
/// Returns `(fired, new_last_fired)`. On fire the new value is `now`; otherwise
/// `last_fired` is returned unchanged. The caller persists it.
#[inline]
pub fn due_since(last_fired: u32, period_ms: u32, now: u32) -> (bool, u32) {
    if now.wrapping_sub(last_fired) >= period_ms {
        (true, now)
    } else {
        (false, last_fired)
    }
}

/// Caller-owned "last fired" record around `due_since`.
#[derive(Debug, Clone)]
pub struct Gate {
    period_ms: u32,
    last_fired: Option<u32>,
}

impl Gate {
    /// A gate with period 0 fires on every poll.
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            last_fired: None,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn last_fired(&self) -> Option<u32> {
        self.last_fired
    }

    /// Fire (and record `now`) if due. A gate that never fired is always due.
    pub fn poll(&mut self, now: u32) -> bool {
        let fired = match self.last_fired {
            None => true,
            Some(last) => due_since(last, self.period_ms, now).0,
        };
        if fired {
            self.last_fired = Some(now);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 500, 499, false, 0)]
    #[case(0, 500, 500, true, 500)]
    #[case(1_000, 500, 2_000, true, 2_000)]
    #[case(u32::MAX - 100, 500, 398, false, u32::MAX - 100)]
    #[case(u32::MAX - 100, 500, 399, true, 399)]
    fn due_since_table(
        #[case] last: u32,
        #[case] period: u32,
        #[case] now: u32,
        #[case] fired: bool,
        #[case] new_last: u32,
    ) {
        assert_eq!(due_since(last, period, now), (fired, new_last));
    }

    #[test]
    fn first_poll_fires_then_waits_a_period() {
        let mut gate = Gate::new(1_000);
        assert!(gate.poll(123));
        assert!(!gate.poll(124));
        assert!(!gate.poll(1_122));
        assert!(gate.poll(1_123));
        assert_eq!(gate.last_fired(), Some(1_123));
    }

    #[test]
    fn zero_period_fires_every_poll() {
        let mut gate = Gate::new(0);
        assert!(gate.poll(5));
        assert!(gate.poll(5));
        assert!(gate.poll(6));
    }
}
