//! Raspberry Pi GPIO implementations of the bin capabilities (`hardware` feature).

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use smartbin_traits::{Buzzer, DeviceError, DistanceSensor, LoadCell, Servo, TouchSensor};

use crate::error::{HwError, Result};
use crate::hx711::Hx711;
use crate::util::{echo_to_cm, measure_high_pulse_with_timeout};

/// Hobby servo frame: 50 Hz, 0.5 ms .. 2.5 ms pulse for 0° .. 180°.
const SERVO_PERIOD: Duration = Duration::from_millis(20);
const SERVO_MIN_PULSE_US: u64 = 500;
const SERVO_MAX_PULSE_US: u64 = 2500;

fn gpio_err(e: rppal::gpio::Error) -> HwError {
    HwError::Gpio(e.to_string())
}

fn output_pin(gpio: &Gpio, pin: u8) -> Result<OutputPin> {
    Ok(gpio.get(pin).map_err(gpio_err)?.into_output_low())
}

fn input_pin(gpio: &Gpio, pin: u8) -> Result<InputPin> {
    Ok(gpio.get(pin).map_err(gpio_err)?.into_input())
}

/// HC-SR04 style ultrasonic ranger.
pub struct HardwareUltrasonic {
    trigger: OutputPin,
    echo: InputPin,
}

impl HardwareUltrasonic {
    pub fn new(trigger_pin: u8, echo_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            trigger: output_pin(&gpio, trigger_pin)?,
            echo: input_pin(&gpio, echo_pin)?,
        })
    }
}

impl DistanceSensor for HardwareUltrasonic {
    fn read_distance_cm(&mut self, timeout: Duration) -> std::result::Result<f32, DeviceError> {
        // 10 µs trigger pulse
        self.trigger.set_high();
        std::thread::sleep(Duration::from_micros(10));
        self.trigger.set_low();

        let echo = &self.echo;
        let pulse = measure_high_pulse_with_timeout(|| echo.is_high(), timeout)?;
        let cm = echo_to_cm(pulse);
        tracing::trace!(cm, "ultrasonic echo");
        Ok(cm)
    }
}

/// HX711 load cell with a small bounded retry on data-ready timeouts.
pub struct HardwareLoadCell {
    hx711: Hx711,
}

impl HardwareLoadCell {
    pub fn new(dt_pin: u8, sck_pin: u8, ready_timeout: Duration) -> Result<Self> {
        // 25 pulses: channel A, gain 128
        let hx711 = Hx711::new(dt_pin, sck_pin, 25, ready_timeout)?;
        Ok(Self { hx711 })
    }
}

impl LoadCell for HardwareLoadCell {
    fn read_raw(&mut self) -> std::result::Result<f32, DeviceError> {
        let mut attempts = 0;
        let max_attempts = 2;
        loop {
            match self.hx711.read_counts() {
                Ok(raw) => return Ok(raw as f32),
                Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                    attempts += 1;
                    tracing::debug!(retries = attempts, "hx711 not ready, retrying");
                }
                Err(e) => return Err(Box::new(e)),
            }
        }
    }
}

/// Capacitive touch module with a digital output (high = touched).
pub struct HardwareTouch {
    pin: InputPin,
}

impl HardwareTouch {
    pub fn new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            pin: input_pin(&gpio, pin)?,
        })
    }
}

impl TouchSensor for HardwareTouch {
    fn is_touched(&mut self) -> std::result::Result<bool, DeviceError> {
        Ok(self.pin.is_high())
    }
}

/// Lid servo on a software-PWM GPIO.
pub struct PwmServo {
    pin: OutputPin,
}

impl PwmServo {
    pub fn new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            pin: output_pin(&gpio, pin)?,
        })
    }
}

impl Servo for PwmServo {
    fn write_angle(&mut self, degrees: u8) -> std::result::Result<(), DeviceError> {
        let deg = u64::from(degrees.min(180));
        let pulse_us =
            SERVO_MIN_PULSE_US + (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) * deg / 180;
        self.pin
            .set_pwm(SERVO_PERIOD, Duration::from_micros(pulse_us))
            .map_err(gpio_err)?;
        Ok(())
    }
}

/// Passive piezo buzzer on a software-PWM GPIO (50 % duty square wave).
pub struct PwmBuzzer {
    pin: OutputPin,
}

impl PwmBuzzer {
    pub fn new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        Ok(Self {
            pin: output_pin(&gpio, pin)?,
        })
    }
}

impl Buzzer for PwmBuzzer {
    fn tone_on(&mut self, freq_hz: u32) -> std::result::Result<(), DeviceError> {
        self.pin
            .set_pwm_frequency(f64::from(freq_hz.max(1)), 0.5)
            .map_err(gpio_err)?;
        Ok(())
    }

    fn tone_off(&mut self) -> std::result::Result<(), DeviceError> {
        self.pin.clear_pwm().map_err(gpio_err)?;
        self.pin.set_low();
        Ok(())
    }
}
