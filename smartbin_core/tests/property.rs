use proptest::prelude::*;
use smartbin_core::{
    Calibration, DisplayMessage, Fullness, LidState, RemoteIntent, SensorSnapshot, decide,
};

prop_compose! {
    fn fullness_strategy()(kind in 0u8..3, v in 0.0f32..200.0) -> Fullness {
        match kind {
            0 => Fullness::Unknown,
            1 => Fullness::RawDistanceCm(v),
            _ => Fullness::Percent(v.min(100.0)),
        }
    }
}

prop_compose! {
    fn snapshot_strategy()(
        fullness in fullness_strategy(),
        weight in proptest::option::of(-10.0f32..500.0),
        touch in any::<bool>(),
    ) -> SensorSnapshot {
        SensorSnapshot { fullness, weight, touch, sampled_at: 0 }
    }
}

prop_compose! {
    fn lid_strategy()(open in any::<bool>(), opened_at in any::<u32>()) -> LidState {
        if open { LidState::Open { opened_at } } else { LidState::Closed }
    }
}

fn intent(requested: bool) -> RemoteIntent {
    RemoteIntent {
        lid_open_requested: requested,
        valid_at: Some(0),
    }
}

proptest! {
    #[test]
    fn decide_is_deterministic(
        s in snapshot_strategy(),
        requested in any::<bool>(),
        lid in lid_strategy(),
        now in any::<u32>(),
    ) {
        let cal = Calibration::default();
        let a = decide(&s, &intent(requested), lid, &cal, now);
        let b = decide(&s, &intent(requested), lid, &cal, now);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn open_transition_stamps_now(
        s in snapshot_strategy(),
        requested in any::<bool>(),
        now in any::<u32>(),
    ) {
        let d = decide(&s, &intent(requested), LidState::Closed, &Calibration::default(), now);
        if let LidState::Open { opened_at } = d.lid {
            prop_assert_eq!(opened_at, now);
        }
    }

    #[test]
    fn open_lid_keeps_its_timestamp(
        s in snapshot_strategy(),
        requested in any::<bool>(),
        opened_at in any::<u32>(),
        elapsed in 0u32..100_000,
    ) {
        let lid = LidState::Open { opened_at };
        let d = decide(&s, &intent(requested), lid, &Calibration::default(), opened_at.wrapping_add(elapsed));
        prop_assert!(d.lid == lid || d.lid == LidState::Closed);
    }

    #[test]
    fn no_auto_close_before_delay(
        s in snapshot_strategy(),
        opened_at in any::<u32>(),
        elapsed in 0u32..15_000,
    ) {
        let lid = LidState::Open { opened_at };
        let d = decide(&s, &intent(false), lid, &Calibration::default(), opened_at.wrapping_add(elapsed));
        prop_assert_eq!(d.lid, lid);
    }

    #[test]
    fn unknown_fullness_never_alerts_without_remote(
        weight in proptest::option::of(-10.0f32..500.0),
        touch in any::<bool>(),
        lid in lid_strategy(),
        now in any::<u32>(),
    ) {
        let s = SensorSnapshot { fullness: Fullness::Unknown, weight, touch, sampled_at: 0 };
        let d = decide(&s, &intent(false), lid, &Calibration::default(), now);
        prop_assert!(!d.alert);
        if lid == LidState::Closed {
            prop_assert_eq!(d.lid, LidState::Closed);
            prop_assert_eq!(d.display, DisplayMessage::Idle);
        }
    }

    #[test]
    fn alert_only_with_its_messages(
        s in snapshot_strategy(),
        requested in any::<bool>(),
        lid in lid_strategy(),
        now in any::<u32>(),
    ) {
        let d = decide(&s, &intent(requested), lid, &Calibration::default(), now);
        if d.alert {
            prop_assert!(matches!(
                d.display,
                DisplayMessage::Full | DisplayMessage::CloseWhenDone | DisplayMessage::PleaseCompress
            ));
        }
        if d.display == DisplayMessage::Blank {
            prop_assert_eq!(d.lid, LidState::Closed);
        }
    }
}
