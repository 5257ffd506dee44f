//! Paced run loop around `BinController::tick`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::controller::BinController;
use crate::decision::LidState;
use crate::status::TickReport;

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Ticks whose work took at least one loop period.
    pub overruns: u64,
    pub lid_opens: u64,
    pub final_lid: LidState,
}

/// Time left in the loop period after `elapsed_ms` of work. `None` = overrun.
#[inline]
fn remaining_ms(loop_ms: u32, elapsed_ms: u32) -> Option<u32> {
    loop_ms.checked_sub(elapsed_ms).filter(|r| *r > 0)
}

/// Run until `shutdown` is set or `max_ticks` ticks have been executed,
/// calling `on_tick` after each tick. The buzzer is silenced on exit.
pub fn run_with<F>(
    controller: &mut BinController,
    shutdown: &AtomicBool,
    max_ticks: Option<u64>,
    mut on_tick: F,
) -> RunSummary
where
    F: FnMut(&TickReport),
{
    let clock = controller.clock().clone();
    let loop_ms = controller.calibration().timing.loop_ms;
    let mut ticks = 0u64;
    let mut overruns = 0u64;
    let mut lid_opens = 0u64;

    tracing::info!(loop_ms, max_ticks, "control loop start");
    while !shutdown.load(Ordering::Relaxed) && max_ticks.is_none_or(|max| ticks < max) {
        let started = clock.now_ms();
        let report = controller.tick_at(started);
        ticks += 1;
        if report.lid_opened() {
            lid_opens += 1;
        }
        on_tick(&report);

        match remaining_ms(loop_ms, clock.ms_since(started)) {
            Some(rest) => clock.sleep(Duration::from_millis(u64::from(rest))),
            None => {
                overruns += 1;
                tracing::debug!(loop_ms, "tick overran loop period");
            }
        }
    }

    controller.silence();
    let summary = RunSummary {
        ticks,
        overruns,
        lid_opens,
        final_lid: controller.context().lid,
    };
    tracing::info!(ticks, overruns, lid_opens, "control loop stopped");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time_and_overrun() {
        assert_eq!(remaining_ms(20, 5), Some(15));
        assert_eq!(remaining_ms(20, 20), None);
        assert_eq!(remaining_ms(20, 35), None);
    }
}
