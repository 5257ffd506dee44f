//! Builder for `BinController`.
//!
//! Every sensor and actuator must be supplied; the remote store and clock are
//! optional (an offline store and `MonotonicClock` are used otherwise).

use std::sync::Arc;
use std::time::Duration;

use smartbin_traits::clock::{Clock, MonotonicClock};
use smartbin_traits::{
    Buzzer, Display, DistanceSensor, LoadCell, RemoteStore, Servo, TouchSensor,
};

use crate::acquisition::Acquisition;
use crate::actuator::ActuatorCoordinator;
use crate::config::Calibration;
use crate::controller::{BinController, ControllerContext};
use crate::error::{BuildError, Result};
use crate::mocks::OfflineRemote;
use crate::remote::RemoteBridge;

#[derive(Default)]
pub struct BinControllerBuilder {
    distance: Option<Box<dyn DistanceSensor>>,
    load_cell: Option<Box<dyn LoadCell>>,
    touch: Option<Box<dyn TouchSensor>>,
    servo: Option<Box<dyn Servo>>,
    display: Option<Box<dyn Display>>,
    buzzer: Option<Box<dyn Buzzer>>,
    remote: Option<Box<dyn RemoteStore>>,
    calibration: Option<Calibration>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl BinController {
    pub fn builder() -> BinControllerBuilder {
        BinControllerBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Reject calibrations the loop cannot run with.
fn validate(cal: &Calibration) -> Result<()> {
    let t = &cal.timing;
    if t.auto_close_ms == 0 {
        return Err(invalid("auto_close_ms must be >= 1"));
    }
    if t.auto_close_ms <= t.touch_hold_ms {
        return Err(invalid("auto_close_ms must be > touch_hold_ms"));
    }
    if t.buzz_half_period_ms == 0 {
        return Err(invalid("buzz_half_period_ms must be >= 1"));
    }
    if !(cal.thresholds.compression_ratio.is_finite() && cal.thresholds.compression_ratio > 0.0) {
        return Err(invalid("compression_ratio must be > 0"));
    }
    if !cal.thresholds.block_threshold_pct.is_finite() {
        return Err(invalid("block_threshold_pct must be finite"));
    }
    if cal.tone_hz == 0 {
        return Err(invalid("tone_hz must be > 0"));
    }
    if cal.timeouts.echo_ms == 0 {
        return Err(invalid("echo timeout must be >= 1"));
    }
    Ok(())
}

impl BinControllerBuilder {
    pub fn with_distance_sensor(mut self, s: impl DistanceSensor + 'static) -> Self {
        self.distance = Some(Box::new(s));
        self
    }
    pub fn with_load_cell(mut self, s: impl LoadCell + 'static) -> Self {
        self.load_cell = Some(Box::new(s));
        self
    }
    pub fn with_touch_sensor(mut self, s: impl TouchSensor + 'static) -> Self {
        self.touch = Some(Box::new(s));
        self
    }
    pub fn with_servo(mut self, s: impl Servo + 'static) -> Self {
        self.servo = Some(Box::new(s));
        self
    }
    pub fn with_display(mut self, d: impl Display + 'static) -> Self {
        self.display = Some(Box::new(d));
        self
    }
    pub fn with_buzzer(mut self, b: impl Buzzer + 'static) -> Self {
        self.buzzer = Some(Box::new(b));
        self
    }
    pub fn with_remote(mut self, r: impl RemoteStore + 'static) -> Self {
        self.remote = Some(Box::new(r));
        self
    }
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn try_build(self) -> Result<BinController> {
        let distance = self
            .distance
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDistanceSensor))?;
        let load_cell = self
            .load_cell
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLoadCell))?;
        let touch = self
            .touch
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTouchSensor))?;
        let servo = self
            .servo
            .ok_or_else(|| eyre::Report::new(BuildError::MissingServo))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        let buzzer = self
            .buzzer
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBuzzer))?;
        let remote = self
            .remote
            .unwrap_or_else(|| Box::new(OfflineRemote) as Box<dyn RemoteStore>);

        let calibration = self.calibration.unwrap_or_default();
        validate(&calibration)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        let timing = &calibration.timing;
        let acquisition = Acquisition::new(
            distance,
            load_cell,
            touch,
            calibration.fullness.clone(),
            calibration.weight.clone(),
            timing,
            Duration::from_millis(calibration.timeouts.echo_ms),
        );
        let remote = RemoteBridge::new(remote, timing.remote_poll_ms, timing.publish_ms);
        let actuators = ActuatorCoordinator::new(
            servo,
            display,
            buzzer,
            calibration.servo.clone(),
            calibration.tone_hz,
            timing.buzz_half_period_ms,
        );

        Ok(BinController {
            acquisition,
            remote,
            actuators,
            calibration,
            clock,
            ctx: ControllerContext::default(),
        })
    }
}
