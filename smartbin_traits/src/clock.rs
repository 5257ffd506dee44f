use std::thread;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock used by every timing decision in the stack.
///
/// - now_ms(): milliseconds since the clock's epoch, wrapping at `u32::MAX`
///   (roughly 49.7 days) like a microcontroller tick counter
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): wrapping elapsed milliseconds since an earlier `now_ms()` value
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `earlier`, computed as an unsigned wrapping
    /// difference so a counter rollover between the two readings is harmless.
    fn ms_since(&self, earlier: u32) -> u32 {
        self.now_ms().wrapping_sub(earlier)
    }
}

/// Real-time clock backed by `std::time::Instant`, counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        // Truncation is the wraparound.
        self.epoch.elapsed().as_millis() as u32
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic clock whose time only moves when told to.
    ///
    /// sleep(d) advances internal time by d without actually sleeping.
    /// Clones share the same time source.
    #[derive(Debug, Clone, Default)]
    pub struct TestClock {
        now: Arc<Mutex<u32>>,
    }

    impl TestClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start at an arbitrary tick value (useful for wraparound tests).
        pub fn starting_at(ms: u32) -> Self {
            let clock = Self::new();
            clock.set_ms(ms);
            clock
        }

        /// Advance the clock by `ms`, wrapping like the hardware counter.
        pub fn advance_ms(&self, ms: u32) {
            if let Ok(mut now) = self.now.lock() {
                *now = now.wrapping_add(ms);
            }
        }

        /// Set the absolute tick value.
        pub fn set_ms(&self, ms: u32) {
            if let Ok(mut now) = self.now.lock() {
                *now = ms;
            }
        }
    }

    impl Clock for TestClock {
        fn now_ms(&self) -> u32 {
            self.now.lock().map(|g| *g).unwrap_or(0)
        }

        fn sleep(&self, d: Duration) {
            self.advance_ms(d.as_millis().min(u128::from(u32::MAX)) as u32);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn ms_since_survives_counter_wrap() {
            let clock = TestClock::starting_at(u32::MAX - 9);
            let earlier = clock.now_ms();
            clock.advance_ms(25);
            assert_eq!(clock.now_ms(), 15);
            assert_eq!(clock.ms_since(earlier), 25);
        }

        #[test]
        fn sleep_advances_without_blocking() {
            let clock = TestClock::new();
            clock.sleep(Duration::from_millis(1500));
            assert_eq!(clock.now_ms(), 1500);
        }
    }
}
