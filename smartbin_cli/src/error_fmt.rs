//! Human-readable error descriptions and structured JSON error formatting.

/// Explanations for calibration CSV failures, matched on the loader's text.
fn calibration_hint(msg: &str) -> Option<String> {
    let lower = msg.to_ascii_lowercase();
    if lower.contains("calibration csv must have headers") {
        return Some("Invalid headers in calibration CSV. Expected 'raw,grams'.".to_string());
    }
    if lower.contains("calibration") && (lower.contains("rows") || lower.contains("slope")) {
        return Some(format!(
            "What happened: The load-cell calibration could not be fitted.\nLikely causes: Too few rows, repeated or non-monotonic raw values.\nHow to fix: Record at least two points at different loads. Details: {msg}"
        ));
    }
    None
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use smartbin_core::error::{BinError, BuildError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingDistanceSensor
            | BuildError::MissingLoadCell
            | BuildError::MissingTouchSensor => format!(
                "What happened: {be}.\nLikely causes: A sensor driver failed to initialize or was not wired into the builder.\nHow to fix: Check the [pins] section and that every sensor is passed to the controller builder."
            ),
            BuildError::MissingServo | BuildError::MissingDisplay | BuildError::MissingBuzzer => format!(
                "What happened: {be}.\nLikely causes: An actuator driver failed to initialize or was not wired into the builder.\nHow to fix: Check the [pins] section and that every actuator is passed to the controller builder."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/smartbin.toml for a sample."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<BinError>() {
        if let BinError::Config(msg) = de
            && let Some(hint) = calibration_hint(msg)
        {
            return hint;
        }
        if matches!(de, BinError::Timeout) {
            return "What happened: A sensor read timed out.\nLikely causes: Ultrasonic or HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify the [pins] and power, and consider increasing hardware.echo_timeout_ms or hardware.hx711_ready_timeout_ms.".to_string();
        }
        return format!(
            "What happened: {de}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if let Some(hint) = calibration_hint(&msg) {
        return hint;
    }

    if lower.contains("hx711") && lower.contains("timeout") {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise hardware.hx711_ready_timeout_ms.".to_string();
    }

    if lower.contains("echo timeout") {
        return "What happened: The ultrasonic sensor returned no echo.\nLikely causes: Wrong trigger/echo pins, nothing in range, or timeout too low.\nHow to fix: Check [pins] and raise hardware.echo_timeout_ms.".to_string();
    }

    if lower.contains("open ") && lower.contains(" pin") {
        return format!(
            "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO. Details: {msg}"
        );
    }

    if lower.contains("invalid config") || lower.contains("missing field") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [pins] (trigger, echo, hx711_dt, hx711_sck, touch, servo, buzzer), or out-of-range values.\nHow to fix: Edit the TOML config and try again. Details: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 = configuration, 3 = hardware/timeout, 1 = anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use smartbin_core::error::{BinError, BuildError};
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => 2,
            _ => 3,
        };
    }
    if let Some(de) = err.downcast_ref::<BinError>() {
        return match de {
            BinError::Config(_) => 2,
            BinError::Hardware(_) | BinError::HardwareFault(_) | BinError::Timeout => 3,
            BinError::Remote(_) => 1,
        };
    }
    1
}

/// Short machine-readable reason name for JSON output.
fn reason_name(err: &eyre::Report) -> &'static str {
    use smartbin_core::error::{BinError, BuildError};
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "InvalidConfig",
            _ => "MissingDevice",
        };
    }
    if let Some(de) = err.downcast_ref::<BinError>() {
        return match de {
            BinError::Hardware(_) => "Hardware",
            BinError::HardwareFault(_) => "HardwareFault",
            BinError::Timeout => "Timeout",
            BinError::Remote(_) => "Remote",
            BinError::Config(_) => "Config",
        };
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbin_core::error::{BinError, BuildError};

    #[test]
    fn invalid_config_maps_to_code_two() {
        let err = eyre::Report::new(BuildError::InvalidConfig("tone_hz must be > 0"));
        assert_eq!(exit_code_for_error(&err), 2);
        assert!(humanize(&err).contains("tone_hz must be > 0"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "InvalidConfig");
    }

    #[test]
    fn csv_header_message_is_short() {
        let err = eyre::Report::new(BinError::Config(
            "calibration CSV must have headers 'raw,grams', got: raw,value".into(),
        ));
        assert_eq!(
            humanize(&err),
            "Invalid headers in calibration CSV. Expected 'raw,grams'."
        );
        assert_eq!(exit_code_for_error(&err), 2);
    }

    #[test]
    fn unfittable_calibration_is_a_config_error() {
        let err = eyre::Report::new(BinError::Config(
            "calibration requires at least two rows, got 1".into(),
        ));
        assert!(humanize(&err).contains("could not be fitted"));
        assert_eq!(exit_code_for_error(&err), 2);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
    }
}
