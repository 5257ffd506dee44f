//! Sensor acquisition: distance, weight and touch into one `SensorSnapshot`.
//!
//! Every read applies its failure policy here, so nothing downstream ever sees
//! a device error:
//! - distance failure → `Fullness::Unknown`
//! - weight failure → last known good value (or `None`)
//! - touch failure → "not touched" for this poll; the latch keeps holding

use std::time::Duration;

use smartbin_traits::{DistanceSensor, LoadCell, TouchSensor};

use crate::config::{FullnessCal, Timing, WeightCal};
use crate::gate::Gate;
use crate::hw_error::map_hw_error;
use crate::touch::TouchLatch;

/// Fill level of the bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fullness {
    /// Normalized fill level in `[0, 100]`.
    Percent(f32),
    /// Distance bounds are not configured; the raw distance is reported as is.
    RawDistanceCm(f32),
    /// No usable echo.
    Unknown,
}

impl Fullness {
    /// Value used by the decision rules, `None` when unknown.
    pub fn value(&self) -> Option<f32> {
        match *self {
            Fullness::Percent(v) | Fullness::RawDistanceCm(v) => Some(v),
            Fullness::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Fullness::Unknown)
    }
}

/// Readings taken during one tick. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub fullness: Fullness,
    /// Calibrated weight, `None` if the load cell never produced a reading.
    pub weight: Option<f32>,
    /// Latched touch state.
    pub touch: bool,
    pub sampled_at: u32,
}

impl SensorSnapshot {
    /// A snapshot with nothing known yet.
    pub fn empty(now: u32) -> Self {
        Self {
            fullness: Fullness::Unknown,
            weight: None,
            touch: false,
            sampled_at: now,
        }
    }
}

pub struct Acquisition<D, W, T> {
    distance: D,
    load_cell: W,
    touch: T,
    fullness_cal: FullnessCal,
    weight_cal: WeightCal,
    echo_timeout: Duration,
    distance_gate: Gate,
    weight_gate: Gate,
    latch: TouchLatch,
    last_fullness: Fullness,
    last_good_weight: Option<f32>,
}

impl<D, W, T> Acquisition<D, W, T>
where
    D: DistanceSensor,
    W: LoadCell,
    T: TouchSensor,
{
    pub fn new(
        distance: D,
        load_cell: W,
        touch: T,
        fullness_cal: FullnessCal,
        weight_cal: WeightCal,
        timing: &Timing,
        echo_timeout: Duration,
    ) -> Self {
        Self {
            distance,
            load_cell,
            touch,
            fullness_cal,
            weight_cal,
            echo_timeout,
            distance_gate: Gate::new(timing.distance_period_ms),
            weight_gate: Gate::new(timing.weight_period_ms),
            latch: TouchLatch::new(timing.touch_hold_ms),
            last_fullness: Fullness::Unknown,
            last_good_weight: None,
        }
    }

    /// One distance read, normalized. Never returns an error.
    pub fn read_fullness(&mut self) -> Fullness {
        let fullness = match self.distance.read_distance_cm(self.echo_timeout) {
            Ok(cm) if cm.is_finite() && cm >= 0.0 => {
                tracing::trace!(distance_cm = cm, "distance read");
                self.fullness_cal.normalize(cm)
            }
            Ok(cm) => {
                tracing::warn!(distance_cm = cm, "distance sensor returned an invalid value");
                Fullness::Unknown
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                // Only log the transition; a disconnected sensor would flood otherwise.
                if self.last_fullness.is_known() {
                    tracing::warn!(error = %err, "distance unavailable");
                } else {
                    tracing::trace!(error = %err, "distance unavailable");
                }
                Fullness::Unknown
            }
        };
        self.last_fullness = fullness;
        fullness
    }

    /// One load-cell read, calibrated. Falls back to the last good value.
    pub fn read_weight(&mut self) -> Option<f32> {
        match self.load_cell.read_raw() {
            Ok(raw) if raw.is_finite() => {
                let w = self.weight_cal.to_weight(raw);
                tracing::trace!(raw, weight = w, "weight read");
                self.last_good_weight = Some(w);
            }
            Ok(raw) => {
                tracing::warn!(raw, "load cell returned a non-finite value");
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                tracing::warn!(error = %err, last_good = ?self.last_good_weight, "weight unavailable");
            }
        }
        self.last_good_weight
    }

    /// Poll the touch pad and return the latched state.
    pub fn read_touch(&mut self, now: u32) -> bool {
        let raw = match self.touch.is_touched() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(error = %map_hw_error(e.as_ref()), "touch read failed");
                false
            }
        };
        let was = self.latch.is_latched();
        let latched = self.latch.update(raw, now);
        if latched != was {
            tracing::debug!(latched, "touch latch changed");
        }
        latched
    }

    /// Build the snapshot for this tick. Distance and weight are refreshed on
    /// their own cadence and reused in between; touch is polled every call.
    pub fn acquire(&mut self, now: u32) -> SensorSnapshot {
        if self.distance_gate.poll(now) {
            self.read_fullness();
        }
        if self.weight_gate.poll(now) {
            self.read_weight();
        }
        let touch = self.read_touch(now);
        SensorSnapshot {
            fullness: self.last_fullness,
            weight: self.last_good_weight,
            touch,
            sampled_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_hardware::{SimulatedLoadCell, SimulatedTouch, SimulatedUltrasonic};

    type SimAcquisition = Acquisition<SimulatedUltrasonic, SimulatedLoadCell, SimulatedTouch>;

    fn rig(
        distance: Option<f32>,
        raw: Option<f32>,
    ) -> (SimAcquisition, SimulatedUltrasonic, SimulatedLoadCell, SimulatedTouch) {
        let us = SimulatedUltrasonic::new(distance);
        let lc = SimulatedLoadCell::new(raw);
        let touch = SimulatedTouch::new();
        let acq = Acquisition::new(
            us.clone(),
            lc.clone(),
            touch.clone(),
            FullnessCal {
                distance_min_cm: Some(5.0),
                distance_max_cm: Some(45.0),
            },
            WeightCal {
                divider: 2.0,
                tare_counts: 100,
            },
            &Timing::default(),
            Duration::from_millis(30),
        );
        (acq, us, lc, touch)
    }

    #[test]
    fn missing_echo_reports_unknown() {
        let (mut acq, us, _, _) = rig(None, Some(100.0));
        assert_eq!(acq.read_fullness(), Fullness::Unknown);
        us.set_distance(Some(25.0));
        assert_eq!(acq.read_fullness(), Fullness::Percent(50.0));
        us.set_distance(Some(f32::NAN));
        assert_eq!(acq.read_fullness(), Fullness::Unknown);
    }

    #[test]
    fn weight_falls_back_to_last_good() {
        let (mut acq, _, lc, _) = rig(Some(25.0), None);
        assert_eq!(acq.read_weight(), None);
        lc.set_raw(Some(300.0));
        assert_eq!(acq.read_weight(), Some(100.0));
        lc.set_raw(None);
        assert_eq!(acq.read_weight(), Some(100.0));
    }

    #[test]
    fn acquire_reuses_values_between_refreshes() {
        let (mut acq, us, _, _) = rig(Some(45.0), Some(100.0));
        let first = acq.acquire(0);
        assert_eq!(first.fullness, Fullness::Percent(0.0));
        assert_eq!(first.weight, Some(0.0));

        us.set_distance(Some(5.0));
        assert_eq!(acq.acquire(499).fullness, Fullness::Percent(0.0));
        assert_eq!(acq.acquire(500).fullness, Fullness::Percent(100.0));
    }

    #[test]
    fn acquire_latches_touch() {
        let (mut acq, _, _, touch) = rig(Some(25.0), Some(100.0));
        touch.set_touched(true);
        assert!(acq.acquire(1_000).touch);
        touch.set_touched(false);
        assert!(acq.acquire(10_999).touch);
        assert!(!acq.acquire(11_000).touch);
    }
}
