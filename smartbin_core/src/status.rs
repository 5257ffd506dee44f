//! Per-tick report returned by the controller.

use crate::acquisition::SensorSnapshot;
use crate::decision::{Decision, LidState};
use crate::remote::{PublishOutcome, RemoteIntent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub now: u32,
    pub snapshot: SensorSnapshot,
    pub intent: RemoteIntent,
    pub decision: Decision,
    /// Lid state before this tick.
    pub previous_lid: LidState,
    pub published: PublishOutcome,
}

impl TickReport {
    pub fn lid_opened(&self) -> bool {
        !self.previous_lid.is_open() && self.decision.lid.is_open()
    }

    pub fn lid_closed(&self) -> bool {
        self.previous_lid.is_open() && !self.decision.lid.is_open()
    }
}
