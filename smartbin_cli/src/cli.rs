//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "smartbin", version, about = "Smart waste bin controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/smartbin.toml")]
    pub config: PathBuf,

    /// Optional load-cell calibration CSV (strict header `raw,grams`)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides `[logging] level`
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until Ctrl-C (or the tick budget)
    Run {
        /// Stop after this many ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Simulated ultrasonic distance; omit to simulate a missing echo
        #[arg(long, value_name = "CM")]
        sim_distance_cm: Option<f32>,
        /// Simulated raw load-cell reading; omit to simulate a silent HX711
        #[arg(long, value_name = "RAW")]
        sim_weight: Option<f32>,
        /// Press the simulated touch pad for one tick at this offset from start (repeatable)
        #[arg(long = "sim-touch-at-ms", value_name = "MS")]
        sim_touch_at_ms: Vec<u32>,
        /// Pre-set the simulated remote "open lid" request
        #[arg(long, action = ArgAction::SetTrue)]
        sim_remote_open: bool,
    },
    /// Build every device and read each sensor once
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}
