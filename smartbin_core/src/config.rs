//! Runtime calibration for the control loop.
//!
//! These are the read-only structs the core consumes. They are separate from
//! the TOML-deserialized schema in `smartbin_config`; see `conversions`.

use crate::acquisition::Fullness;

/// Distance bounds used to turn an ultrasonic reading into a fill percentage.
#[derive(Debug, Clone, Default)]
pub struct FullnessCal {
    /// Distance (cm) measured when the bin is full.
    pub distance_min_cm: Option<f32>,
    /// Distance (cm) measured when the bin is empty.
    pub distance_max_cm: Option<f32>,
}

impl FullnessCal {
    /// Normalize a distance into `[0, 100]` percent full.
    ///
    /// Without both bounds, or with a non-positive range, the raw distance is
    /// passed through unchanged.
    pub fn normalize(&self, distance_cm: f32) -> Fullness {
        match (self.distance_min_cm, self.distance_max_cm) {
            (Some(min), Some(max)) if (max - min).is_finite() && max - min > 0.0 => {
                let pct = (max - distance_cm) / (max - min) * 100.0;
                Fullness::Percent(pct.clamp(0.0, 100.0))
            }
            _ => Fullness::RawDistanceCm(distance_cm),
        }
    }
}

/// Linear load-cell model: weight = (raw - tare_counts) / divider.
#[derive(Debug, Clone)]
pub struct WeightCal {
    pub divider: f32,
    pub tare_counts: i64,
}

impl Default for WeightCal {
    fn default() -> Self {
        Self {
            divider: 1.0,
            tare_counts: 0,
        }
    }
}

impl WeightCal {
    pub fn to_weight(&self, raw: f32) -> f32 {
        let net = raw - self.tare_counts as f32;
        if self.divider.is_finite() && self.divider != 0.0 {
            net / self.divider
        } else {
            net
        }
    }
}

/// Servo angles for the two lid positions, in degrees.
#[derive(Debug, Clone)]
pub struct ServoAngles {
    pub open: u8,
    pub closed: u8,
}

impl Default for ServoAngles {
    fn default() -> Self {
        Self {
            open: 90,
            closed: 0,
        }
    }
}

/// Decision thresholds.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Touch-open is refused at or above this fullness.
    pub block_threshold_pct: f32,
    /// Prompt for compression when fullness / weight exceeds this.
    pub compression_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            block_threshold_pct: 80.0,
            compression_ratio: 10.0,
        }
    }
}

/// All loop timing, in milliseconds.
#[derive(Debug, Clone)]
pub struct Timing {
    pub auto_close_ms: u32,
    pub touch_hold_ms: u32,
    pub buzz_half_period_ms: u32,
    pub distance_period_ms: u32,
    pub weight_period_ms: u32,
    pub remote_poll_ms: u32,
    pub publish_ms: u32,
    pub loop_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            auto_close_ms: 15_000,
            touch_hold_ms: 10_000,
            buzz_half_period_ms: 250,
            distance_period_ms: 500,
            weight_period_ms: 1_000,
            remote_poll_ms: 5_000,
            publish_ms: 2_000,
            loop_ms: 20,
        }
    }
}

/// Timeouts handed to drivers.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max wait for an ultrasonic echo (ms).
    pub echo_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { echo_ms: 30 }
    }
}

/// Static configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub fullness: FullnessCal,
    pub weight: WeightCal,
    pub servo: ServoAngles,
    pub thresholds: Thresholds,
    pub timing: Timing,
    pub timeouts: Timeouts,
    pub tone_hz: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            fullness: FullnessCal::default(),
            weight: WeightCal::default(),
            servo: ServoAngles::default(),
            thresholds: Thresholds::default(),
            timing: Timing::default(),
            timeouts: Timeouts::default(),
            tone_hz: 2_000,
        }
    }
}
