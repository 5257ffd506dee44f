//! Device assembly and the `run` / `self-check` commands.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use smartbin_core::{BinController, Calibration, LidState, RunSummary};
use smartbin_hardware::{SimulatedDisplay, SimulatedTouch};
use smartbin_traits::{Clock, DistanceSensor, LoadCell, TouchSensor};

/// Knobs for the simulated devices (ignored on real hardware).
#[derive(Debug, Clone, Default)]
pub struct SimOptions {
    pub distance_cm: Option<f32>,
    pub raw_weight: Option<f32>,
    pub touch_at_ms: Vec<u32>,
    pub remote_open: bool,
}

/// The controller plus handles the CLI keeps for steering simulated inputs.
pub struct Assembled {
    pub controller: BinController,
    touch: Option<SimulatedTouch>,
}

pub fn lid_name(lid: LidState) -> &'static str {
    match lid {
        LidState::Closed => "closed",
        LidState::Open { .. } => "open",
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn assemble(cfg: &smartbin_config::Config, cal: Calibration, _sim: &SimOptions) -> eyre::Result<Assembled> {
    use eyre::WrapErr;
    use smartbin_hardware::hardware::{
        HardwareLoadCell, HardwareTouch, HardwareUltrasonic, PwmBuzzer, PwmServo,
    };

    let p = &cfg.pins;
    let ultrasonic = HardwareUltrasonic::new(p.trigger, p.echo).wrap_err("open ultrasonic pins")?;
    let load_cell = HardwareLoadCell::new(
        p.hx711_dt,
        p.hx711_sck,
        Duration::from_millis(cfg.hardware.hx711_ready_timeout_ms),
    )
    .wrap_err("open hx711 pins")?;
    let touch = HardwareTouch::new(p.touch).wrap_err("open touch pin")?;
    let servo = PwmServo::new(p.servo).wrap_err("open servo pin")?;
    let buzzer = PwmBuzzer::new(p.buzzer).wrap_err("open buzzer pin")?;

    // No LCD driver yet; frames go to the log.
    let controller = BinController::builder()
        .with_distance_sensor(ultrasonic)
        .with_load_cell(load_cell)
        .with_touch_sensor(touch)
        .with_servo(servo)
        .with_display(SimulatedDisplay::new())
        .with_buzzer(buzzer)
        .with_calibration(cal)
        .try_build()?;
    Ok(Assembled {
        controller,
        touch: None,
    })
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn assemble(_cfg: &smartbin_config::Config, cal: Calibration, sim: &SimOptions) -> eyre::Result<Assembled> {
    use smartbin_core::remote::OPEN_LID_PATH;
    use smartbin_hardware::{
        InMemoryRemote, SimulatedBuzzer, SimulatedLoadCell, SimulatedServo, SimulatedUltrasonic,
    };

    let touch = SimulatedTouch::new();
    let remote = InMemoryRemote::new();
    if sim.remote_open {
        remote.set_value(OPEN_LID_PATH, 1.0);
    }

    let controller = BinController::builder()
        .with_distance_sensor(SimulatedUltrasonic::new(sim.distance_cm))
        .with_load_cell(SimulatedLoadCell::new(sim.raw_weight))
        .with_touch_sensor(touch.clone())
        .with_servo(SimulatedServo::new())
        .with_display(SimulatedDisplay::new())
        .with_buzzer(SimulatedBuzzer::new())
        .with_remote(remote)
        .with_calibration(cal)
        .try_build()?;
    Ok(Assembled {
        controller,
        touch: Some(touch),
    })
}

/// Run the loop; returns the summary after shutdown or the tick budget.
pub fn run_loop(
    assembled: Assembled,
    max_ticks: Option<u64>,
    touch_at_ms: &[u32],
    shutdown: Arc<AtomicBool>,
) -> RunSummary {
    let Assembled {
        mut controller,
        touch,
    } = assembled;

    let mut pending: Vec<u32> = touch_at_ms.to_vec();
    pending.sort_unstable();
    let mut pending: VecDeque<u32> = pending.into();
    let loop_ms = controller.calibration().timing.loop_ms;
    let start = controller.clock().now_ms();

    // Press for the first tick at or after each scheduled offset.
    let mut press_if_due = move |elapsed_next: u32| {
        let Some(pad) = touch.as_ref() else {
            return;
        };
        let mut pressed = false;
        while pending.front().is_some_and(|t| *t <= elapsed_next) {
            pending.pop_front();
            pressed = true;
        }
        if pressed {
            tracing::info!(at_ms = elapsed_next, "simulated touch");
        }
        pad.set_touched(pressed);
    };
    press_if_due(0);

    smartbin_core::run_with(&mut controller, &shutdown, max_ticks, |report| {
        press_if_due(report.now.wrapping_sub(start).saturating_add(loop_ms));
    })
}

/// One-shot sensor probe used by `self-check`.
pub fn self_check(cfg: &smartbin_config::Config, sim: &SimOptions) -> eyre::Result<()> {
    let timeout = Duration::from_millis(cfg.hardware.echo_timeout_ms);

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let (mut distance, mut load_cell, mut touch): (
        Box<dyn DistanceSensor>,
        Box<dyn LoadCell>,
        Box<dyn TouchSensor>,
    ) = {
        use eyre::WrapErr;
        use smartbin_hardware::hardware::{HardwareLoadCell, HardwareTouch, HardwareUltrasonic};
        let p = &cfg.pins;
        let _ = sim;
        (
            Box::new(HardwareUltrasonic::new(p.trigger, p.echo).wrap_err("open ultrasonic pins")?),
            Box::new(
                HardwareLoadCell::new(
                    p.hx711_dt,
                    p.hx711_sck,
                    Duration::from_millis(cfg.hardware.hx711_ready_timeout_ms),
                )
                .wrap_err("open hx711 pins")?,
            ),
            Box::new(HardwareTouch::new(p.touch).wrap_err("open touch pin")?),
        )
    };
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let (mut distance, mut load_cell, mut touch): (
        Box<dyn DistanceSensor>,
        Box<dyn LoadCell>,
        Box<dyn TouchSensor>,
    ) = (
        Box::new(smartbin_hardware::SimulatedUltrasonic::new(
            sim.distance_cm.or(Some(30.0)),
        )),
        Box::new(smartbin_hardware::SimulatedLoadCell::new(
            sim.raw_weight.or(Some(0.0)),
        )),
        Box::new(SimulatedTouch::new()),
    );

    let cm = distance
        .read_distance_cm(timeout)
        .map_err(|e| eyre::eyre!("ultrasonic read failed: {e}"))?;
    let raw = load_cell
        .read_raw()
        .map_err(|e| eyre::eyre!("hx711 read failed: {e}"))?;
    let touched = touch
        .is_touched()
        .map_err(|e| eyre::eyre!("touch read failed: {e}"))?;
    tracing::info!(distance_cm = cm, raw, touched, "self-check readings");
    Ok(())
}
