mod cli;
mod error_fmt;
mod logging;
mod run;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use smartbin_config::WeightCalibration;
use smartbin_core::Calibration;
use smartbin_core::error::BinError;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{SimOptions, lid_name};

/// Read, parse and validate the config, then fold in the calibration CSV.
///
/// Every failure here is reported as `BinError::Config`. The fitted weight
/// calibration is returned so it can be logged once logging is up.
fn load_config(
    path: &Path,
    calibration: Option<&Path>,
) -> eyre::Result<(smartbin_config::Config, Option<WeightCalibration>)> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| BinError::Config(format!("read {}: {e}", path.display())))?;
    let mut cfg = smartbin_config::load_toml(&text)
        .map_err(|e| BinError::Config(format!("parse {}: {e}", path.display())))?;
    let fitted = match calibration {
        Some(csv) => {
            let fitted = smartbin_config::load_calibration_csv(csv)
                .map_err(|e| BinError::Config(format!("{e:#}")))?;
            cfg.apply_weight_calibration(fitted);
            Some(fitted)
        }
        None => None,
    };
    cfg.validate()
        .map_err(|e| BinError::Config(e.to_string()))?;
    Ok((cfg, fitted))
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let (cfg, fitted) = load_config(&cli.config, cli.calibration.as_deref())?;
    logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");
    if let Some(fitted) = fitted {
        tracing::debug!(
            divider = fitted.divider,
            tare_counts = fitted.tare_counts,
            "weight calibration loaded"
        );
    }

    match cli.cmd {
        Commands::Health => {
            println!("ok");
            Ok(())
        }
        Commands::SelfCheck => {
            run::self_check(&cfg, &SimOptions::default())?;
            println!("ok");
            Ok(())
        }
        Commands::Run {
            ticks,
            sim_distance_cm,
            sim_weight,
            sim_touch_at_ms,
            sim_remote_open,
        } => {
            let sim = SimOptions {
                distance_cm: sim_distance_cm,
                raw_weight: sim_weight,
                touch_at_ms: sim_touch_at_ms,
                remote_open: sim_remote_open,
            };
            let assembled = run::assemble(&cfg, Calibration::from(&cfg), &sim)
                .wrap_err("assemble controller")?;

            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || {
                    flag.store(true, Ordering::Relaxed);
                })
                .wrap_err("install Ctrl-C handler")?;
            }

            let summary = run::run_loop(assembled, ticks, &sim.touch_at_ms, shutdown);
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ticks": summary.ticks,
                        "overruns": summary.overruns,
                        "lid_opens": summary.lid_opens,
                        "final_lid": lid_name(summary.final_lid),
                    })
                );
            } else {
                println!(
                    "stopped after {} ticks: {} lid opens, {} overruns, lid {}",
                    summary.ticks,
                    summary.lid_opens,
                    summary.overruns,
                    lid_name(summary.final_lid)
                );
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    match real_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "fatal");
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", format_error_json(&err));
            } else {
                eprintln!("{}", humanize(&err));
            }
            let code = exit_code_for_error(&err);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
