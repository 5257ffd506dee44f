//! Device-layer implementations of the `smartbin_traits` capabilities.
//!
//! The simulated devices share their state through `Rc<Cell<_>>` handles, so a
//! clone kept by a test (or the CLI's scenario driver) can steer a device that
//! the controller owns.

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hardware;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hx711;
pub mod util;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use smartbin_traits::{
    Buzzer, DeviceError, Display, DistanceSensor, LoadCell, RemoteStore, Servo, TouchSensor,
};

use crate::error::HwError;

/// Simulated ultrasonic sensor. `None` simulates a missing echo.
#[derive(Clone, Default)]
pub struct SimulatedUltrasonic {
    distance_cm: Rc<Cell<Option<f32>>>,
}

impl SimulatedUltrasonic {
    pub fn new(distance_cm: Option<f32>) -> Self {
        Self {
            distance_cm: Rc::new(Cell::new(distance_cm)),
        }
    }

    pub fn set_distance(&self, distance_cm: Option<f32>) {
        self.distance_cm.set(distance_cm);
    }
}

impl DistanceSensor for SimulatedUltrasonic {
    fn read_distance_cm(&mut self, _timeout: Duration) -> Result<f32, DeviceError> {
        match self.distance_cm.get() {
            Some(cm) => Ok(cm),
            None => Err(Box::new(HwError::EchoTimeout)),
        }
    }
}

/// Simulated load cell. `None` simulates an HX711 that never becomes ready.
#[derive(Clone, Default)]
pub struct SimulatedLoadCell {
    raw: Rc<Cell<Option<f32>>>,
}

impl SimulatedLoadCell {
    pub fn new(raw: Option<f32>) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
        }
    }

    pub fn set_raw(&self, raw: Option<f32>) {
        self.raw.set(raw);
    }
}

impl LoadCell for SimulatedLoadCell {
    fn read_raw(&mut self) -> Result<f32, DeviceError> {
        match self.raw.get() {
            Some(raw) => Ok(raw),
            None => Err(Box::new(HwError::DataReadyTimeout)),
        }
    }
}

/// Simulated touch pad.
#[derive(Clone, Default)]
pub struct SimulatedTouch {
    touched: Rc<Cell<bool>>,
}

impl SimulatedTouch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_touched(&self, touched: bool) {
        self.touched.set(touched);
    }
}

impl TouchSensor for SimulatedTouch {
    fn is_touched(&mut self) -> Result<bool, DeviceError> {
        Ok(self.touched.get())
    }
}

/// Simulated servo that records the last angle and the number of writes.
#[derive(Clone, Default)]
pub struct SimulatedServo {
    angle: Rc<Cell<Option<u8>>>,
    writes: Rc<Cell<usize>>,
}

impl SimulatedServo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> Option<u8> {
        self.angle.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl Servo for SimulatedServo {
    fn write_angle(&mut self, degrees: u8) -> Result<(), DeviceError> {
        tracing::debug!(degrees, "servo write (simulated)");
        self.angle.set(Some(degrees));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Simulated display that keeps the last frame.
#[derive(Clone, Default)]
pub struct SimulatedDisplay {
    lines: Rc<RefCell<Vec<String>>>,
    writes: Rc<Cell<usize>>,
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl Display for SimulatedDisplay {
    fn show(&mut self, lines: &[&str]) -> Result<(), DeviceError> {
        tracing::info!(
            line1 = lines.first().copied().unwrap_or(""),
            line2 = lines.get(1).copied().unwrap_or(""),
            "display (simulated)"
        );
        *self.lines.borrow_mut() = lines.iter().map(|l| (*l).to_string()).collect();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Simulated buzzer that records whether a tone is playing and how often it
/// was switched on.
#[derive(Clone, Default)]
pub struct SimulatedBuzzer {
    on: Rc<Cell<bool>>,
    tone_ons: Rc<Cell<usize>>,
}

impl SimulatedBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn tone_ons(&self) -> usize {
        self.tone_ons.get()
    }
}

impl Buzzer for SimulatedBuzzer {
    fn tone_on(&mut self, freq_hz: u32) -> Result<(), DeviceError> {
        tracing::trace!(freq_hz, "buzzer on (simulated)");
        self.on.set(true);
        self.tone_ons.set(self.tone_ons.get() + 1);
        Ok(())
    }

    fn tone_off(&mut self) -> Result<(), DeviceError> {
        tracing::trace!("buzzer off (simulated)");
        self.on.set(false);
        Ok(())
    }
}

/// In-memory stand-in for the remote realtime database.
///
/// Values are stored as `f64` per path. Readiness and write failures can be
/// toggled to exercise the degraded paths.
#[derive(Clone)]
pub struct InMemoryRemote {
    ready: Rc<Cell<bool>>,
    fail_io: Rc<Cell<bool>>,
    values: Rc<RefCell<HashMap<String, f64>>>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self {
            ready: Rc::new(Cell::new(true)),
            fail_io: Rc::new(Cell::new(false)),
            values: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    /// Make every read and write fail while the session still reports ready.
    pub fn set_failing(&self, failing: bool) {
        self.fail_io.set(failing);
    }

    /// Operator-side write (what the companion app does).
    pub fn set_value(&self, path: &str, value: f64) {
        self.values.borrow_mut().insert(path.to_string(), value);
    }

    pub fn value(&self, path: &str) -> Option<f64> {
        self.values.borrow().get(path).copied()
    }

    fn check(&self) -> Result<(), DeviceError> {
        if !self.ready.get() || self.fail_io.get() {
            return Err(Box::new(HwError::RemoteUnavailable));
        }
        Ok(())
    }
}

impl RemoteStore for InMemoryRemote {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn read_int(&mut self, path: &str) -> Result<Option<i64>, DeviceError> {
        self.check()?;
        Ok(self.values.borrow().get(path).map(|v| *v as i64))
    }

    fn write_f32(&mut self, path: &str, value: f32) -> Result<(), DeviceError> {
        self.check()?;
        self.values
            .borrow_mut()
            .insert(path.to_string(), f64::from(value));
        Ok(())
    }

    fn write_int(&mut self, path: &str, value: i64) -> Result<(), DeviceError> {
        self.check()?;
        self.values.borrow_mut().insert(path.to_string(), value as f64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_ultrasonic_times_out_without_echo() {
        let mut sensor = SimulatedUltrasonic::new(None);
        let err = sensor
            .read_distance_cm(Duration::from_millis(30))
            .expect_err("no echo");
        assert!(err.to_string().contains("timeout"));

        sensor.set_distance(Some(42.0));
        assert_eq!(sensor.read_distance_cm(Duration::ZERO).unwrap(), 42.0);
    }

    #[test]
    fn clones_share_state() {
        let servo = SimulatedServo::new();
        let mut owned = servo.clone();
        owned.write_angle(90).unwrap();
        assert_eq!(servo.angle(), Some(90));
        assert_eq!(servo.writes(), 1);
    }

    #[test]
    fn remote_rejects_io_when_not_ready() {
        let remote = InMemoryRemote::new();
        let mut owned = remote.clone();
        remote.set_value("/open_lid", 1.0);
        assert_eq!(owned.read_int("/open_lid").unwrap(), Some(1));

        remote.set_ready(false);
        assert!(!owned.is_ready());
        assert!(owned.write_int("/Readings/touch", 1).is_err());
        assert_eq!(remote.value("/Readings/touch"), None);
    }
}
