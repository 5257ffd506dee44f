//! Capability traits between the bin control core and the device layer.
//!
//! Sensors, actuators and the remote data store are all reached through these
//! narrow interfaces. Implementations report failures as boxed errors; the core
//! decides how to degrade.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Error type crossing every capability boundary.
pub type DeviceError = Box<dyn std::error::Error + Send + Sync>;

/// Ultrasonic (or other time-of-flight) distance sensor above the bin contents.
pub trait DistanceSensor {
    /// Measure the distance to the contents in centimetres. The implementation
    /// must give up and return an error once `timeout` passes without an echo.
    fn read_distance_cm(&mut self, timeout: Duration) -> Result<f32, DeviceError>;
}

/// Load cell under the bin; reports uncalibrated counts.
pub trait LoadCell {
    fn read_raw(&mut self) -> Result<f32, DeviceError>;
}

/// Capacitive touch pad on the lid.
pub trait TouchSensor {
    fn is_touched(&mut self) -> Result<bool, DeviceError>;
}

/// Lid servo.
pub trait Servo {
    fn write_angle(&mut self, degrees: u8) -> Result<(), DeviceError>;
}

/// Two-line status display.
pub trait Display {
    fn show(&mut self, lines: &[&str]) -> Result<(), DeviceError>;
}

/// Piezo buzzer driven by a square wave.
pub trait Buzzer {
    fn tone_on(&mut self, freq_hz: u32) -> Result<(), DeviceError>;
    fn tone_off(&mut self) -> Result<(), DeviceError>;
}

/// Keyed remote data store (one scalar per path).
///
/// Session set-up and renewal belong to the implementation; callers only ask
/// whether it is ready before each operation.
pub trait RemoteStore {
    fn is_ready(&self) -> bool;
    /// Read an integer/boolean value. `Ok(None)` means the key is absent.
    fn read_int(&mut self, path: &str) -> Result<Option<i64>, DeviceError>;
    fn write_f32(&mut self, path: &str, value: f32) -> Result<(), DeviceError>;
    fn write_int(&mut self, path: &str, value: i64) -> Result<(), DeviceError>;
}

impl<T: DistanceSensor + ?Sized> DistanceSensor for Box<T> {
    fn read_distance_cm(&mut self, timeout: Duration) -> Result<f32, DeviceError> {
        (**self).read_distance_cm(timeout)
    }
}

impl<T: LoadCell + ?Sized> LoadCell for Box<T> {
    fn read_raw(&mut self) -> Result<f32, DeviceError> {
        (**self).read_raw()
    }
}

impl<T: TouchSensor + ?Sized> TouchSensor for Box<T> {
    fn is_touched(&mut self) -> Result<bool, DeviceError> {
        (**self).is_touched()
    }
}

impl<T: Servo + ?Sized> Servo for Box<T> {
    fn write_angle(&mut self, degrees: u8) -> Result<(), DeviceError> {
        (**self).write_angle(degrees)
    }
}

impl<T: Display + ?Sized> Display for Box<T> {
    fn show(&mut self, lines: &[&str]) -> Result<(), DeviceError> {
        (**self).show(lines)
    }
}

impl<T: Buzzer + ?Sized> Buzzer for Box<T> {
    fn tone_on(&mut self, freq_hz: u32) -> Result<(), DeviceError> {
        (**self).tone_on(freq_hz)
    }
    fn tone_off(&mut self) -> Result<(), DeviceError> {
        (**self).tone_off()
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
    fn read_int(&mut self, path: &str) -> Result<Option<i64>, DeviceError> {
        (**self).read_int(path)
    }
    fn write_f32(&mut self, path: &str, value: f32) -> Result<(), DeviceError> {
        (**self).write_f32(path, value)
    }
    fn write_int(&mut self, path: &str, value: i64) -> Result<(), DeviceError> {
        (**self).write_int(path, value)
    }
}
