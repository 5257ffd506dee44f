//! One iteration of the control loop.
//!
//! Order within a tick: acquire, poll remote, decide, actuate, publish. The
//! controller holds no decision logic of its own.

use std::sync::Arc;

use smartbin_traits::{
    Buzzer, Clock, Display, DistanceSensor, LoadCell, RemoteStore, Servo, TouchSensor,
};

use crate::acquisition::{Acquisition, SensorSnapshot};
use crate::actuator::ActuatorCoordinator;
use crate::config::Calibration;
use crate::decision::{LidState, decide};
use crate::remote::{RemoteBridge, RemoteIntent};
use crate::status::TickReport;

pub(crate) type BoxedAcquisition =
    Acquisition<Box<dyn DistanceSensor>, Box<dyn LoadCell>, Box<dyn TouchSensor>>;
pub(crate) type BoxedActuators =
    ActuatorCoordinator<Box<dyn Servo>, Box<dyn Display>, Box<dyn Buzzer>>;

/// Mutable loop state carried from one tick to the next.
#[derive(Debug, Clone, Default)]
pub struct ControllerContext {
    pub lid: LidState,
    pub intent: RemoteIntent,
    pub last_snapshot: Option<SensorSnapshot>,
    pub ticks: u64,
}

pub struct BinController {
    pub(crate) acquisition: BoxedAcquisition,
    pub(crate) remote: RemoteBridge<Box<dyn RemoteStore>>,
    pub(crate) actuators: BoxedActuators,
    pub(crate) calibration: Calibration,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) ctx: ControllerContext,
}

impl core::fmt::Debug for BinController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BinController")
            .field("ctx", &self.ctx)
            .field("lid_written", &self.actuators.lid_open())
            .field("shown", &self.actuators.shown())
            .finish_non_exhaustive()
    }
}

impl BinController {
    pub fn context(&self) -> &ControllerContext {
        &self.ctx
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Run one tick at the current clock time.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        self.tick_at(now)
    }

    /// Run one tick at an explicit timestamp.
    pub fn tick_at(&mut self, now: u32) -> TickReport {
        let snapshot = self.acquisition.acquire(now);
        let intent = self.remote.poll_lid_intent(now);

        let previous_lid = self.ctx.lid;
        let decision = decide(&snapshot, &intent, previous_lid, &self.calibration, now);

        if decision.lid != previous_lid {
            match decision.lid {
                LidState::Open { .. } => tracing::info!(
                    touch = snapshot.touch,
                    remote = intent.lid_open_requested,
                    fullness = ?snapshot.fullness,
                    "lid opening"
                ),
                LidState::Closed => tracing::info!("lid closing"),
            }
        }
        if decision.alert && !self.actuators.oscillator().is_active() {
            tracing::debug!(display = ?decision.display, "alert started");
        }

        self.actuators.apply(&decision, now);
        self.ctx.lid = decision.lid;
        self.ctx.intent = intent;
        self.ctx.last_snapshot = Some(snapshot);
        self.ctx.ticks += 1;

        let published = self.remote.publish(now, &snapshot, decision.lid);

        TickReport {
            now,
            snapshot,
            intent,
            decision,
            previous_lid,
            published,
        }
    }

    /// Stop the buzzer immediately (used on shutdown).
    pub fn silence(&mut self) {
        self.actuators.silence();
    }
}
