#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Smart bin control core (hardware-agnostic).
//!
//! All device access goes through the capability traits in `smartbin_traits`;
//! nothing here touches GPIO or the network directly.
//!
//! ## Architecture
//!
//! - **Gate**: wrapping-millisecond rate limiter (`gate` module)
//! - **Acquisition**: distance, weight and latched touch into a `SensorSnapshot`
//! - **Remote bridge**: operator lid intent in, readings out (`remote` module)
//! - **Decision**: pure lid/display/alert state machine (`decision` module)
//! - **Actuators**: change-only servo/display writes and the buzzer oscillator
//! - **Controller**: one tick = acquire, poll, decide, actuate, publish
//!
//! Device failures never stop the loop. Sensors degrade to explicit unknowns,
//! the remote falls back to its previous intent, actuator writes are retried
//! naturally on the next tick.

pub mod acquisition;
pub mod actuator;
pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod decision;
pub mod error;
pub mod gate;
pub mod hw_error;
pub mod mocks;
pub mod remote;
pub mod runner;
pub mod status;
pub mod touch;

pub use acquisition::{Acquisition, Fullness, SensorSnapshot};
pub use actuator::{ActuatorCoordinator, BuzzerOscillator, ToneCommand};
pub use builder::BinControllerBuilder;
pub use config::{Calibration, FullnessCal, ServoAngles, Thresholds, Timeouts, Timing, WeightCal};
pub use controller::{BinController, ControllerContext};
pub use decision::{Decision, DisplayMessage, LidState, decide};
pub use error::{BinError, BuildError};
pub use gate::{Gate, due_since};
pub use remote::{PublishOutcome, RemoteBridge, RemoteIntent};
pub use runner::{RunSummary, run_with};
pub use status::TickReport;
pub use touch::TouchLatch;
