//! `From` implementations bridging `smartbin_config` types to `smartbin_core` types.

use crate::config::{Calibration, FullnessCal, ServoAngles, Thresholds, Timeouts, Timing, WeightCal};

// ── Fullness ─────────────────────────────────────────────────────────────────

impl From<&smartbin_config::FullnessCfg> for FullnessCal {
    fn from(c: &smartbin_config::FullnessCfg) -> Self {
        Self {
            distance_min_cm: c.distance_min_cm,
            distance_max_cm: c.distance_max_cm,
        }
    }
}

// ── Weight ───────────────────────────────────────────────────────────────────

impl From<&smartbin_config::WeightCfg> for WeightCal {
    fn from(c: &smartbin_config::WeightCfg) -> Self {
        Self {
            divider: c.divider,
            tare_counts: c.tare_counts,
        }
    }
}

impl From<smartbin_config::WeightCalibration> for WeightCal {
    fn from(c: smartbin_config::WeightCalibration) -> Self {
        Self {
            divider: c.divider,
            tare_counts: c.tare_counts,
        }
    }
}

// ── Servo ────────────────────────────────────────────────────────────────────

impl From<&smartbin_config::ServoCfg> for ServoAngles {
    fn from(c: &smartbin_config::ServoCfg) -> Self {
        Self {
            open: c.open_angle,
            closed: c.closed_angle,
        }
    }
}

// ── Timing ───────────────────────────────────────────────────────────────────

impl From<&smartbin_config::TimingCfg> for Timing {
    fn from(c: &smartbin_config::TimingCfg) -> Self {
        Self {
            auto_close_ms: c.auto_close_ms,
            touch_hold_ms: c.touch_hold_ms,
            buzz_half_period_ms: c.buzz_half_period_ms,
            distance_period_ms: c.distance_period_ms,
            weight_period_ms: c.weight_period_ms,
            remote_poll_ms: c.remote_poll_ms,
            publish_ms: c.publish_ms,
            loop_ms: c.loop_ms,
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&smartbin_config::Hardware> for Timeouts {
    fn from(c: &smartbin_config::Hardware) -> Self {
        Self {
            echo_ms: c.echo_timeout_ms,
        }
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&smartbin_config::Config> for Calibration {
    fn from(c: &smartbin_config::Config) -> Self {
        Self {
            fullness: FullnessCal::from(&c.fullness),
            weight: WeightCal::from(&c.weight),
            servo: ServoAngles::from(&c.servo),
            thresholds: Thresholds {
                block_threshold_pct: c.fullness.block_threshold_pct,
                compression_ratio: c.thresholds.compression_ratio,
            },
            timing: Timing::from(&c.timing),
            timeouts: Timeouts::from(&c.hardware),
            tone_hz: c.alert.tone_hz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_runtime_defaults() {
        let cfg = smartbin_config::load_toml(
            r#"
            [pins]
            trigger = 23
            echo = 24
            hx711_dt = 5
            hx711_sck = 6
            touch = 17
            servo = 18
            buzzer = 13
            "#,
        )
        .expect("parse");
        let cal = Calibration::from(&cfg);
        let def = Calibration::default();
        assert_eq!(cal.timing.auto_close_ms, def.timing.auto_close_ms);
        assert_eq!(cal.timing.touch_hold_ms, def.timing.touch_hold_ms);
        assert_eq!(cal.thresholds.block_threshold_pct, def.thresholds.block_threshold_pct);
        assert_eq!(cal.thresholds.compression_ratio, def.thresholds.compression_ratio);
        assert_eq!(cal.servo.open, def.servo.open);
        assert_eq!(cal.tone_hz, def.tone_hz);
        assert_eq!(cal.timeouts.echo_ms, def.timeouts.echo_ms);
        assert!(cal.fullness.distance_min_cm.is_none());
    }
}
