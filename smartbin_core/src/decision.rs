//! Bin control state machine.
//!
//! `decide` is a pure function of the snapshot, the remote intent, the current
//! lid state, the calibration and `now`. It owns every lid transition.

use crate::acquisition::SensorSnapshot;
use crate::config::{Calibration, Thresholds};
use crate::remote::RemoteIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LidState {
    #[default]
    Closed,
    /// `opened_at` is the timestamp of the most recent open transition.
    Open { opened_at: u32 },
}

impl LidState {
    pub fn is_open(&self) -> bool {
        matches!(self, LidState::Open { .. })
    }
}

/// What the two-line display shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMessage {
    Idle,
    Ready,
    Full,
    CloseWhenDone,
    PleaseCompress,
    Blank,
}

impl DisplayMessage {
    pub fn lines(&self) -> [&'static str; 2] {
        match self {
            DisplayMessage::Idle => ["Touch lid", "to open"],
            DisplayMessage::Ready => ["Lid open", "Ready for waste"],
            DisplayMessage::Full => ["Bin is full", "Lid stays closed"],
            DisplayMessage::CloseWhenDone => ["Service open", "Close when done"],
            DisplayMessage::PleaseCompress => ["Please compress", "the waste"],
            DisplayMessage::Blank => ["", ""],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub lid: LidState,
    pub display: DisplayMessage,
    pub alert: bool,
}

impl Decision {
    fn new(lid: LidState, display: DisplayMessage, alert: bool) -> Self {
        Self { lid, display, alert }
    }
}

/// True when the contents look loose: fullness per unit weight above the
/// configured ratio. Weight is clamped to at least 1.
fn needs_compression(snapshot: &SensorSnapshot, thresholds: &Thresholds) -> bool {
    match (snapshot.fullness.value(), snapshot.weight) {
        (Some(fullness), Some(weight)) => fullness / weight.max(1.0) > thresholds.compression_ratio,
        _ => false,
    }
}

pub fn decide(
    snapshot: &SensorSnapshot,
    intent: &RemoteIntent,
    lid: LidState,
    cal: &Calibration,
    now: u32,
) -> Decision {
    let remote = intent.lid_open_requested;
    match lid {
        LidState::Closed => {
            if snapshot.touch
                && let Some(fullness) = snapshot.fullness.value()
            {
                return if fullness < cal.thresholds.block_threshold_pct {
                    Decision::new(LidState::Open { opened_at: now }, DisplayMessage::Ready, false)
                } else {
                    Decision::new(LidState::Closed, DisplayMessage::Full, true)
                };
            }
            if remote {
                return Decision::new(
                    LidState::Open { opened_at: now },
                    DisplayMessage::CloseWhenDone,
                    true,
                );
            }
            Decision::new(LidState::Closed, DisplayMessage::Idle, false)
        }
        LidState::Open { opened_at } => {
            if remote {
                return Decision::new(lid, DisplayMessage::CloseWhenDone, false);
            }
            if now.wrapping_sub(opened_at) >= cal.timing.auto_close_ms {
                return Decision::new(LidState::Closed, DisplayMessage::Blank, false);
            }
            if needs_compression(snapshot, &cal.thresholds) {
                return Decision::new(lid, DisplayMessage::PleaseCompress, true);
            }
            Decision::new(lid, DisplayMessage::Ready, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Fullness;

    fn snap(touch: bool, fullness: Fullness, weight: Option<f32>) -> SensorSnapshot {
        SensorSnapshot {
            fullness,
            weight,
            touch,
            sampled_at: 0,
        }
    }

    fn intent(requested: bool) -> RemoteIntent {
        RemoteIntent {
            lid_open_requested: requested,
            valid_at: Some(0),
        }
    }

    #[test]
    fn touch_opens_a_bin_with_room() {
        let d = decide(
            &snap(true, Fullness::Percent(50.0), Some(10.0)),
            &intent(false),
            LidState::Closed,
            &Calibration::default(),
            1_000,
        );
        assert_eq!(
            d,
            Decision::new(LidState::Open { opened_at: 1_000 }, DisplayMessage::Ready, false)
        );
    }

    #[test]
    fn untouched_full_bin_idles() {
        let d = decide(
            &snap(false, Fullness::Percent(90.0), Some(5.0)),
            &intent(false),
            LidState::Closed,
            &Calibration::default(),
            1_000,
        );
        assert_eq!(d, Decision::new(LidState::Closed, DisplayMessage::Idle, false));
    }

    #[test]
    fn compression_prompt_while_open() {
        let d = decide(
            &snap(false, Fullness::Percent(60.0), Some(2.0)),
            &intent(false),
            LidState::Open { opened_at: 0 },
            &Calibration::default(),
            1_000,
        );
        assert_eq!(d.display, DisplayMessage::PleaseCompress);
        assert!(d.alert);
        assert!(d.lid.is_open());
    }

    #[test]
    fn zero_weight_is_clamped_not_divided() {
        let d = decide(
            &snap(false, Fullness::Percent(5.0), Some(0.0)),
            &intent(false),
            LidState::Open { opened_at: 0 },
            &Calibration::default(),
            1_000,
        );
        assert_eq!(d.display, DisplayMessage::Ready);
        assert!(!d.alert);
    }

    #[test]
    fn every_message_renders_two_lines() {
        for m in [
            DisplayMessage::Idle,
            DisplayMessage::Ready,
            DisplayMessage::Full,
            DisplayMessage::CloseWhenDone,
            DisplayMessage::PleaseCompress,
        ] {
            assert!(m.lines().iter().all(|l| !l.is_empty() && l.len() <= 16));
        }
        assert_eq!(DisplayMessage::Blank.lines(), ["", ""]);
    }
}
