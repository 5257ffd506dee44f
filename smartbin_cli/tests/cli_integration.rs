use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Build a minimal valid TOML config for sim mode
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
# pins are unused in sim backend but must be present
trigger = 23
echo = 24
hx711_dt = 5
hx711_sck = 6
touch = 17
servo = 18
buzzer = 13

[fullness]
distance_min_cm = 5.0
distance_max_cm = 45.0

[timing]
# keep the sim loop quick
loop_ms = 2
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["health"], 0, "ok", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["run", "--ticks", "5", "--sim-distance-cm", "25"], 0, "stopped after 5 ticks", "stdout")]
#[case(&["run", "--ticks", "3"], 0, "lid closed", "stdout")]
#[case(&["run", "--ticks", "not-a-number"], 2, "invalid value", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("smartbin").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn touch_opens_lid_in_sim() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--ticks")
        .arg("4")
        .arg("--sim-distance-cm")
        .arg("40")
        .arg("--sim-weight")
        .arg("10")
        .arg("--sim-touch-at-ms")
        .arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 lid opens").and(predicate::str::contains("lid open")));
}

#[rstest]
fn full_bin_refuses_touch_in_sim() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("run")
        .arg("--ticks")
        .arg("4")
        .arg("--sim-distance-cm")
        .arg("6")
        .arg("--sim-touch-at-ms")
        .arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0 lid opens"));
}

#[rstest]
fn cli_reports_bad_calibration_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    // Write a bad-header CSV
    let bad_csv = dir.path().join("calib.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "raw,value").unwrap();
    writeln!(f, "100,0.0").unwrap();
    writeln!(f, "200,1.0").unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&bad_csv)
        .arg("self-check");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn single_row_calibration_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let csv = dir.path().join("calib.csv");
    fs::write(&csv, "raw,grams\n100,0\n").unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .arg("health");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("could not be fitted"));
}

#[rstest]
fn cli_accepts_good_calibration() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let csv = dir.path().join("calib.csv");
    fs::write(&csv, "raw,grams\n8000,0\n28000,1000\n").unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .arg("health");

    cmd.assert().success().stdout(predicate::str::contains("ok"));
}

#[rstest]
fn fitted_calibration_is_logged_at_debug() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let csv = dir.path().join("calib.csv");
    fs::write(&csv, "raw,grams\n8000,0\n28000,1000\n").unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .arg("--calibration")
        .arg(&csv)
        .arg("--log-level")
        .arg("debug")
        .arg("health");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("weight calibration loaded"));
}

#[rstest]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        r#"
[pins]
trigger = 23
echo = 24
hx711_dt = 5
hx711_sck = 6
touch = 17
servo = 18
buzzer = 13

[timing]
auto_close_ms = 5000
touch_hold_ms = 10000
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config").arg(&path).arg("health");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("auto_close_ms"));
}

#[rstest]
fn missing_pins_section_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.toml");
    fs::write(&path, "[timing]\nloop_ms = 5\n").unwrap();

    let mut cmd = Command::cargo_bin("smartbin").unwrap();
    cmd.arg("--config").arg(&path).arg("health");
    cmd.assert().code(2).stderr(predicate::str::contains("pins"));
}
