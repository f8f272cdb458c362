//! Write a synthetic cobot log for demos.
//!
//! The output mimics a real controller dump: mostly `HH-MM-SS-mmm`
//! timestamps with a few other layouts and corrupt entries, 6-joint vector
//! columns encoded as text, flags written as `True`/`False`, and the odd
//! missing reading.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

const JOINTS: usize = 6;
const SAMPLE_PERIOD_MS: i64 = 8;

/// SplitMix64 stream; reproducible noise for a fixed seed.
struct NoiseRng(u64);

impl NoiseRng {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Gaussian sensor noise (Box-Muller).
    fn jitter(&mut self, std_dev: f64) -> f64 {
        let u1 = self.next_unit().max(f64::MIN_POSITIVE);
        let u2 = self.next_unit();
        std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.5}")).collect();
    format!("[{}]", parts.join(", "))
}

fn format_timestamp(t: NaiveDateTime, rng: &mut NoiseRng) -> String {
    if rng.chance(0.01) {
        return "not-a-date".to_string();
    }
    if rng.chance(0.05) {
        return t.format("%Y-%m-%d %H:%M:%S%.6f").to_string();
    }
    t.format("%Y-%m-%d %H-%M-%S-%3f").to_string()
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let out_path = PathBuf::from(args.next().unwrap_or_else(|| "cobot_sample.csv".to_string()));
    let rows: usize = match args.next() {
        Some(n) => n.parse().context("row count must be a positive integer")?,
        None => 500,
    };

    let mut rng = NoiseRng(42);
    let start = NaiveDate::from_ymd_opt(2025, 4, 8)
        .and_then(|d| d.and_hms_milli_opt(12, 27, 10, 0))
        .context("building start time")?;

    let mut writer = csv::Writer::from_path(&out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    writer.write_record(["timestamp", "q", "qdot", "tau", "servo_actives", "is_moving", "temperature", "mode"])?;

    let mut lines: Vec<[String; 8]> = Vec::with_capacity(rows);
    for i in 0..rows {
        let t = start + Duration::milliseconds(i as i64 * SAMPLE_PERIOD_MS);
        let phase = i as f64 * 0.02;

        let q: Vec<f64> = (0..JOINTS)
            .map(|j| (phase + j as f64 * 0.5).sin() * (1.0 + j as f64 * 0.1) + rng.jitter(0.002))
            .collect();
        let qdot: Vec<f64> = (0..JOINTS)
            .map(|j| (phase + j as f64 * 0.5).cos() * 0.02 + rng.jitter(0.001))
            .collect();
        let mut tau: Vec<f64> = q.iter().map(|v| v * 12.0 + rng.jitter(0.3)).collect();
        // Occasional collision-like torque spike on joint 2.
        if rng.chance(0.01) {
            tau[2] += 40.0;
        }

        let q_text = if rng.chance(0.02) { "n/a".to_string() } else { format_vector(&q) };
        let servo = if rng.chance(0.01) {
            "[True, True, True]".to_string()
        } else {
            "[True, True, True, True, True, True]".to_string()
        };
        let moving = if rng.chance(0.03) {
            String::new()
        } else if qdot.iter().any(|v| v.abs() > 0.01) {
            "True".to_string()
        } else {
            "False".to_string()
        };
        let temperature = if rng.chance(0.02) {
            "n/a".to_string()
        } else {
            format!("{:.2}", 35.0 + i as f64 * 0.01 + rng.jitter(0.2))
        };
        let mode = if moving == "True" { "run" } else { "idle" };

        lines.push([
            format_timestamp(t, &mut rng),
            q_text,
            format_vector(&qdot),
            format_vector(&tau),
            servo,
            moving,
            temperature,
            mode.to_string(),
        ]);
    }

    // Controllers flush buffers out of order now and then.
    for i in (1..lines.len()).step_by(97) {
        lines.swap(i - 1, i);
    }

    for line in &lines {
        writer.write_record(line)?;
    }
    writer.flush()?;

    println!("Wrote {rows} samples to {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_reproducible_and_in_unit_range() {
        let mut a = NoiseRng(42);
        let mut b = NoiseRng(42);
        for _ in 0..1000 {
            let x = a.next_unit();
            assert_eq!(x, b.next_unit());
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn vectors_render_as_bracketed_lists() {
        assert_eq!(format_vector(&[1.0, -0.5]), "[1.00000, -0.50000]");
    }
}
