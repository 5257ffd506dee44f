//! Actuator coordinator: lid servo, display and buzzer.
//!
//! Writes happen only when the commanded state changes. A failed write is
//! logged and leaves the cached state untouched, so the next tick tries again.

use smartbin_traits::{Buzzer, Display, Servo};

use crate::config::ServoAngles;
use crate::decision::{Decision, DisplayMessage};
use crate::hw_error::map_hw_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCommand {
    On,
    Off,
}

/// Self-timed square-wave alert.
///
/// A request starts toggling only when idle. While active the output flips
/// every half period; it stops once two half periods pass without a request.
#[derive(Debug, Clone)]
pub struct BuzzerOscillator {
    half_period_ms: u32,
    active: bool,
    on: bool,
    last_toggled_at: u32,
    last_request_at: u32,
}

impl BuzzerOscillator {
    pub fn new(half_period_ms: u32) -> Self {
        Self {
            half_period_ms,
            active: false,
            on: false,
            last_toggled_at: 0,
            last_request_at: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn last_toggled_at(&self) -> u32 {
        self.last_toggled_at
    }

    /// Advance the oscillator; returns the output change to apply, if any.
    pub fn update(&mut self, requested: bool, now: u32) -> Option<ToneCommand> {
        if requested {
            self.last_request_at = now;
            if !self.active {
                self.active = true;
                self.on = true;
                self.last_toggled_at = now;
                return Some(ToneCommand::On);
            }
        }
        if !self.active {
            return None;
        }
        if now.wrapping_sub(self.last_request_at) >= self.half_period_ms.saturating_mul(2) {
            return self.stop();
        }
        if now.wrapping_sub(self.last_toggled_at) >= self.half_period_ms {
            self.on = !self.on;
            self.last_toggled_at = now;
            return Some(if self.on {
                ToneCommand::On
            } else {
                ToneCommand::Off
            });
        }
        None
    }

    /// Stop immediately. Returns `Off` if the output was on.
    pub fn stop(&mut self) -> Option<ToneCommand> {
        self.active = false;
        if self.on {
            self.on = false;
            Some(ToneCommand::Off)
        } else {
            None
        }
    }
}

pub struct ActuatorCoordinator<S, Di, B> {
    servo: S,
    display: Di,
    buzzer: B,
    angles: ServoAngles,
    tone_hz: u32,
    lid_open: Option<bool>,
    shown: Option<DisplayMessage>,
    oscillator: BuzzerOscillator,
}

impl<S, Di, B> ActuatorCoordinator<S, Di, B>
where
    S: Servo,
    Di: Display,
    B: Buzzer,
{
    pub fn new(
        servo: S,
        display: Di,
        buzzer: B,
        angles: ServoAngles,
        tone_hz: u32,
        buzz_half_period_ms: u32,
    ) -> Self {
        Self {
            servo,
            display,
            buzzer,
            angles,
            tone_hz,
            lid_open: None,
            shown: None,
            oscillator: BuzzerOscillator::new(buzz_half_period_ms),
        }
    }

    /// Last lid position successfully written.
    pub fn lid_open(&self) -> Option<bool> {
        self.lid_open
    }

    pub fn shown(&self) -> Option<DisplayMessage> {
        self.shown
    }

    pub fn oscillator(&self) -> &BuzzerOscillator {
        &self.oscillator
    }

    /// Move the lid. Returns true if the servo was written.
    pub fn set_lid_position(&mut self, open: bool) -> bool {
        if self.lid_open == Some(open) {
            return false;
        }
        let angle = if open {
            self.angles.open
        } else {
            self.angles.closed
        };
        match self.servo.write_angle(angle) {
            Ok(()) => {
                self.lid_open = Some(open);
                true
            }
            Err(e) => {
                tracing::warn!(angle, error = %map_hw_error(e.as_ref()), "servo write failed");
                false
            }
        }
    }

    /// Show a message. Returns true if the display was written.
    pub fn set_display(&mut self, message: DisplayMessage) -> bool {
        if self.shown == Some(message) {
            return false;
        }
        match self.display.show(&message.lines()) {
            Ok(()) => {
                self.shown = Some(message);
                true
            }
            Err(e) => {
                tracing::warn!(?message, error = %map_hw_error(e.as_ref()), "display write failed");
                false
            }
        }
    }

    pub fn set_alert(&mut self, requested: bool, now: u32) {
        if let Some(cmd) = self.oscillator.update(requested, now) {
            self.drive_buzzer(cmd);
        }
    }

    pub fn apply(&mut self, decision: &Decision, now: u32) {
        self.set_lid_position(decision.lid.is_open());
        self.set_display(decision.display);
        self.set_alert(decision.alert, now);
    }

    /// Stop the buzzer now, regardless of oscillator phase.
    pub fn silence(&mut self) {
        self.oscillator.stop();
        self.drive_buzzer(ToneCommand::Off);
    }

    fn drive_buzzer(&mut self, cmd: ToneCommand) {
        let res = match cmd {
            ToneCommand::On => self.buzzer.tone_on(self.tone_hz),
            ToneCommand::Off => self.buzzer.tone_off(),
        };
        if let Err(e) = res {
            tracing::warn!(?cmd, error = %map_hw_error(e.as_ref()), "buzzer write failed");
        }
    }
}
