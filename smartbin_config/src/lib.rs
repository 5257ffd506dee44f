#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and load-cell calibration parsing for the smart bin.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - The load-cell calibration CSV loader enforces headers and fits a
//!   counts-per-gram divider plus tare baseline by least squares.
use serde::Deserialize;

/// Load-cell calibration CSV schema.
///
/// Expected headers:
/// raw,grams
///
/// Example:
/// raw,grams
/// 8423,0.0
/// 50423,100.0
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub raw: i64,
    pub grams: f32,
}

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub trigger: u8,
    pub echo: u8,
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub touch: u8,
    pub servo: u8,
    pub buzzer: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FullnessCfg {
    /// Distance reading (cm) when the bin is full. Unset = no normalization.
    pub distance_min_cm: Option<f32>,
    /// Distance reading (cm) when the bin is empty. Unset = no normalization.
    pub distance_max_cm: Option<f32>,
    /// Touch-open is refused at or above this fullness (percent).
    pub block_threshold_pct: f32,
}

impl Default for FullnessCfg {
    fn default() -> Self {
        Self {
            distance_min_cm: None,
            distance_max_cm: None,
            block_threshold_pct: 80.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeightCfg {
    /// Load-cell counts per unit of weight
    pub divider: f32,
    /// Raw counts with an empty bin
    pub tare_counts: i64,
}

impl Default for WeightCfg {
    fn default() -> Self {
        Self {
            divider: 1.0,
            tare_counts: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServoCfg {
    pub open_angle: u8,
    pub closed_angle: u8,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            open_angle: 90,
            closed_angle: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingCfg {
    pub auto_close_ms: u32,
    pub touch_hold_ms: u32,
    pub buzz_half_period_ms: u32,
    /// Cadence of ultrasonic reads; 0 = every tick
    pub distance_period_ms: u32,
    /// Cadence of load-cell reads; 0 = every tick
    pub weight_period_ms: u32,
    pub remote_poll_ms: u32,
    pub publish_ms: u32,
    /// Main loop pacing
    pub loop_ms: u32,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            auto_close_ms: 15_000,
            touch_hold_ms: 10_000,
            buzz_half_period_ms: 250,
            distance_period_ms: 500,
            weight_period_ms: 1_000,
            remote_poll_ms: 5_000,
            publish_ms: 2_000,
            loop_ms: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThresholdsCfg {
    /// Fullness-per-weight ratio above which the user is asked to compress
    pub compression_ratio: f32,
}

impl Default for ThresholdsCfg {
    fn default() -> Self {
        Self {
            compression_ratio: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AlertCfg {
    pub tone_hz: u32,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self { tone_hz: 2_000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Max time to wait for an ultrasonic echo before reporting unknown distance
    pub echo_timeout_ms: u64,
    /// Max time to wait for HX711 data-ready (DT low)
    pub hx711_ready_timeout_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            echo_timeout_ms: 30,
            hx711_ready_timeout_ms: 5,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub fullness: FullnessCfg,
    #[serde(default)]
    pub weight: WeightCfg,
    #[serde(default)]
    pub servo: ServoCfg,
    #[serde(default)]
    pub timing: TimingCfg,
    #[serde(default)]
    pub thresholds: ThresholdsCfg,
    #[serde(default)]
    pub alert: AlertCfg,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Linear load-cell model: weight = (raw - tare_counts) / divider.
#[derive(Debug, Clone, Copy)]
pub struct WeightCalibration {
    /// counts per gram
    pub divider: f32,
    /// raw counts at zero load
    pub tare_counts: i64,
}

impl WeightCalibration {
    /// Fit grams = a*raw + b over all rows, then express it as
    /// divider = 1/a and tare = round(-b/a).
    pub fn from_rows(rows: &[CalibrationRow]) -> eyre::Result<Self> {
        if rows.len() < 2 {
            eyre::bail!("calibration requires at least two rows, got {}", rows.len());
        }

        let mut dir: i8 = 0;
        for (i, pair) in rows.windows(2).enumerate() {
            let d = pair[1].raw - pair[0].raw;
            if d == 0 {
                eyre::bail!(
                    "calibration rows have duplicate raw values at index {} and {}",
                    i,
                    i + 1
                );
            }
            let step_dir = if d > 0 { 1 } else { -1 };
            if dir == 0 {
                dir = step_dir;
            } else if dir != step_dir {
                eyre::bail!("calibration raw values must be strictly monotonic");
            }
        }

        // f64 for numerical stability with large HX711 counts
        let n = rows.len() as f64;
        let mean_x = rows.iter().map(|r| r.raw as f64).sum::<f64>() / n;
        let mean_y = rows.iter().map(|r| f64::from(r.grams)).sum::<f64>() / n;
        let (sxx, sxy) = rows.iter().fold((0.0f64, 0.0f64), |(sxx, sxy), r| {
            let x = r.raw as f64 - mean_x;
            let y = f64::from(r.grams) - mean_y;
            (sxx + x * x, sxy + x * y)
        });
        let a = sxy / sxx;
        if !a.is_finite() || a == 0.0 {
            eyre::bail!("calibration produced zero slope (grams do not change with raw)");
        }
        let b = mean_y - a * mean_x;
        let tare = -b / a;
        if !tare.is_finite() {
            eyre::bail!("calibration produced invalid tare baseline");
        }

        Ok(Self {
            divider: (1.0 / a) as f32,
            tare_counts: tare.round() as i64,
        })
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<WeightCalibration> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != ["raw", "grams"] {
        eyre::bail!(
            "calibration CSV must have headers 'raw,grams', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    WeightCalibration::from_rows(&rows)
}

impl Config {
    /// Replace the `[weight]` section with a fitted calibration.
    pub fn apply_weight_calibration(&mut self, cal: WeightCalibration) {
        self.weight.divider = cal.divider;
        self.weight.tare_counts = cal.tare_counts;
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Fullness
        for (name, v) in [
            ("fullness.distance_min_cm", self.fullness.distance_min_cm),
            ("fullness.distance_max_cm", self.fullness.distance_max_cm),
        ] {
            if let Some(cm) = v
                && !(cm.is_finite() && cm >= 0.0)
            {
                eyre::bail!("{name} must be a finite distance >= 0");
            }
        }
        if let (Some(min), Some(max)) = (self.fullness.distance_min_cm, self.fullness.distance_max_cm)
            && min >= max
        {
            eyre::bail!("fullness.distance_min_cm must be < fullness.distance_max_cm");
        }
        if !(0.0..=100.0).contains(&self.fullness.block_threshold_pct) {
            eyre::bail!("fullness.block_threshold_pct must be in [0, 100]");
        }

        // Weight
        if !self.weight.divider.is_finite() || self.weight.divider == 0.0 {
            eyre::bail!("weight.divider must be finite and non-zero");
        }

        // Servo
        if self.servo.open_angle > 180 || self.servo.closed_angle > 180 {
            eyre::bail!("servo angles must be <= 180");
        }

        // Timing
        let t = &self.timing;
        if t.auto_close_ms == 0 {
            eyre::bail!("timing.auto_close_ms must be >= 1");
        }
        if t.touch_hold_ms == 0 {
            eyre::bail!("timing.touch_hold_ms must be >= 1");
        }
        if t.auto_close_ms <= t.touch_hold_ms {
            eyre::bail!("timing.auto_close_ms must be > timing.touch_hold_ms");
        }
        if t.buzz_half_period_ms == 0 {
            eyre::bail!("timing.buzz_half_period_ms must be >= 1");
        }
        if t.remote_poll_ms == 0 {
            eyre::bail!("timing.remote_poll_ms must be >= 1");
        }
        if t.publish_ms == 0 {
            eyre::bail!("timing.publish_ms must be >= 1");
        }
        if t.loop_ms == 0 {
            eyre::bail!("timing.loop_ms must be >= 1");
        }
        if t.loop_ms > 1_000 {
            eyre::bail!("timing.loop_ms is unreasonably large (>1s)");
        }

        // Thresholds
        if !(self.thresholds.compression_ratio.is_finite() && self.thresholds.compression_ratio > 0.0)
        {
            eyre::bail!("thresholds.compression_ratio must be > 0");
        }

        // Alert
        if self.alert.tone_hz == 0 {
            eyre::bail!("alert.tone_hz must be > 0");
        }

        // Hardware
        if self.hardware.echo_timeout_ms == 0 {
            eyre::bail!("hardware.echo_timeout_ms must be >= 1");
        }
        if self.hardware.hx711_ready_timeout_ms == 0 {
            eyre::bail!("hardware.hx711_ready_timeout_ms must be >= 1");
        }

        Ok(())
    }
}
