use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Round-trip time of sound per centimetre of distance, in microseconds
/// (343 m/s at ~20 °C, there and back).
pub const ECHO_US_PER_CM: f32 = 58.0;

/// Wait until the provided `is_high` predicate becomes false (i.e., line goes low),
/// or a timeout expires. Sleeps in small intervals to avoid CPU spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Measure the width of the next high pulse on a line.
///
/// Busy-waits (no sleeping, the pulse is microseconds wide) first for the rising
/// edge and then for the falling edge. The whole measurement is bounded by
/// `timeout`; a missing or unterminated pulse yields `HwError::EchoTimeout`.
pub fn measure_high_pulse_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
) -> Result<Duration> {
    let deadline = Instant::now() + timeout;
    while !is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }
    let rise = Instant::now();
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::EchoTimeout);
        }
        std::hint::spin_loop();
    }
    Ok(rise.elapsed())
}

/// Convert an ultrasonic echo pulse width to a distance in centimetres.
#[inline]
pub fn echo_to_cm(pulse: Duration) -> f32 {
    pulse.as_micros() as f32 / ECHO_US_PER_CM
}
