//! Remote state bridge: pulls the operator's lid intent, pushes readings.
//!
//! Both directions are rate limited and best effort. The bridge asks the store
//! whether it is ready before each operation and never retries within a tick.

use smartbin_traits::RemoteStore;

use crate::acquisition::{Fullness, SensorSnapshot};
use crate::decision::LidState;
use crate::gate::Gate;
use crate::hw_error::map_hw_error;

pub const OPEN_LID_PATH: &str = "/open_lid";
pub const WEIGHT_PATH: &str = "/Readings/weight";
pub const FULLNESS_PATH: &str = "/Readings/fullness";
pub const TOUCH_PATH: &str = "/Readings/touch";
pub const LID_OPEN_PATH: &str = "/Readings/lid_open";

/// Result of the last successful remote poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteIntent {
    pub lid_open_requested: bool,
    /// When the value was last read successfully; `None` before the first read.
    pub valid_at: Option<u32>,
}

/// What a `publish` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    NotDue,
    NotReady,
    Sent { written: u8, failed: u8 },
}

pub struct RemoteBridge<R> {
    store: R,
    poll_gate: Gate,
    publish_gate: Gate,
    intent: RemoteIntent,
}

impl<R: RemoteStore> RemoteBridge<R> {
    pub fn new(store: R, poll_period_ms: u32, publish_period_ms: u32) -> Self {
        Self {
            store,
            poll_gate: Gate::new(poll_period_ms),
            publish_gate: Gate::new(publish_period_ms),
            intent: RemoteIntent::default(),
        }
    }

    pub fn intent(&self) -> RemoteIntent {
        self.intent
    }

    /// Refresh the lid intent when the poll period has elapsed.
    ///
    /// Not ready, a failed read, or a missing key all keep the previous intent.
    pub fn poll_lid_intent(&mut self, now: u32) -> RemoteIntent {
        if !self.poll_gate.poll(now) {
            return self.intent;
        }
        if !self.store.is_ready() {
            tracing::debug!("remote not ready; keeping previous lid intent");
            return self.intent;
        }
        match self.store.read_int(OPEN_LID_PATH) {
            Ok(Some(v)) => {
                let requested = v != 0;
                if requested != self.intent.lid_open_requested {
                    tracing::info!(requested, "remote lid intent changed");
                }
                self.intent = RemoteIntent {
                    lid_open_requested: requested,
                    valid_at: Some(now),
                };
            }
            Ok(None) => tracing::debug!(path = OPEN_LID_PATH, "remote key absent"),
            Err(e) => {
                tracing::warn!(error = %map_hw_error(e.as_ref()), "remote poll failed");
            }
        }
        self.intent
    }

    /// Push the latest readings and lid status when the publish period has
    /// elapsed. Unknown readings are skipped; failed writes are logged only.
    pub fn publish(&mut self, now: u32, snapshot: &SensorSnapshot, lid: LidState) -> PublishOutcome {
        if !self.publish_gate.poll(now) {
            return PublishOutcome::NotDue;
        }
        if !self.store.is_ready() {
            tracing::debug!("remote not ready; skipping publish");
            return PublishOutcome::NotReady;
        }

        let mut written = 0u8;
        let mut failed = 0u8;
        let mut record = |path: &str, res: Result<(), smartbin_traits::DeviceError>| match res {
            Ok(()) => written += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(path, error = %map_hw_error(e.as_ref()), "remote write failed");
            }
        };

        if let Some(w) = snapshot.weight {
            record(WEIGHT_PATH, self.store.write_f32(WEIGHT_PATH, w));
        }
        if let Fullness::Percent(v) | Fullness::RawDistanceCm(v) = snapshot.fullness {
            record(FULLNESS_PATH, self.store.write_f32(FULLNESS_PATH, v));
        }
        record(
            TOUCH_PATH,
            self.store.write_int(TOUCH_PATH, i64::from(snapshot.touch)),
        );
        record(
            LID_OPEN_PATH,
            self.store.write_int(LID_OPEN_PATH, i64::from(lid.is_open())),
        );

        tracing::trace!(written, failed, "published readings");
        PublishOutcome::Sent { written, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_hardware::InMemoryRemote;

    #[test]
    fn poll_is_rate_limited_and_sticky() {
        let remote = InMemoryRemote::new();
        let mut bridge = RemoteBridge::new(remote.clone(), 5_000, 2_000);

        remote.set_value(OPEN_LID_PATH, 1.0);
        let first = bridge.poll_lid_intent(0);
        assert!(first.lid_open_requested);
        assert_eq!(first.valid_at, Some(0));

        remote.set_value(OPEN_LID_PATH, 0.0);
        assert!(bridge.poll_lid_intent(4_999).lid_open_requested);

        remote.set_ready(false);
        let stale = bridge.poll_lid_intent(5_000);
        assert!(stale.lid_open_requested);
        assert_eq!(stale.valid_at, Some(0));

        remote.set_ready(true);
        assert!(!bridge.poll_lid_intent(10_000).lid_open_requested);
    }

    #[test]
    fn missing_key_keeps_default_intent() {
        let mut bridge = RemoteBridge::new(InMemoryRemote::new(), 0, 0);
        assert_eq!(bridge.poll_lid_intent(0), RemoteIntent::default());
    }

    #[test]
    fn publish_skips_unknown_readings() {
        let remote = InMemoryRemote::new();
        let mut bridge = RemoteBridge::new(remote.clone(), 5_000, 2_000);
        let snap = SensorSnapshot {
            fullness: Fullness::Unknown,
            weight: None,
            touch: true,
            sampled_at: 0,
        };
        let out = bridge.publish(0, &snap, LidState::Open { opened_at: 0 });
        assert_eq!(out, PublishOutcome::Sent { written: 2, failed: 0 });
        assert_eq!(remote.value(TOUCH_PATH), Some(1.0));
        assert_eq!(remote.value(LID_OPEN_PATH), Some(1.0));
        assert_eq!(remote.value(WEIGHT_PATH), None);
        assert_eq!(remote.value(FULLNESS_PATH), None);

        assert_eq!(bridge.publish(1_999, &snap, LidState::Closed), PublishOutcome::NotDue);
    }

    #[test]
    fn failing_writes_are_counted_not_retried() {
        let remote = InMemoryRemote::new();
        remote.set_failing(true);
        let mut bridge = RemoteBridge::new(remote.clone(), 5_000, 2_000);
        let snap = SensorSnapshot {
            fullness: Fullness::Percent(40.0),
            weight: Some(3.0),
            touch: false,
            sampled_at: 0,
        };
        assert_eq!(
            bridge.publish(0, &snap, LidState::Closed),
            PublishOutcome::Sent { written: 0, failed: 4 }
        );
        remote.set_ready(false);
        assert_eq!(bridge.publish(2_000, &snap, LidState::Closed), PublishOutcome::NotReady);
    }
}
