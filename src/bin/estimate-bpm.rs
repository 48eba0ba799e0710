//! Estimate the BPM of a single track and print a JSON result
//!
//! Usage:
//!   estimate-bpm <track-path>
//!
//! Prints `{"ok": true, "bpm": ..., "bpmInt": ..., "confidence": ...}` on
//! success (exit 0), or `{"ok": false, "error": ...}` on failure (exit 1).
//! `bpmInt` rounds half away from zero.

use std::path::PathBuf;
use std::process::ExitCode;

use cadence_dsp::{estimate_bpm, EstimatorConfig};
use serde_json::json;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => PathBuf::from(path),
        _ => {
            eprintln!("Usage: estimate-bpm <track-path>");
            return ExitCode::from(2);
        }
    };

    if !path.exists() {
        println!("{}", json!({"ok": false, "error": "track not found"}));
        return ExitCode::from(1);
    }

    let estimate = match estimate_bpm(&path, &EstimatorConfig::default()) {
        Ok(Some(estimate)) => estimate,
        Ok(None) => {
            println!("{}", json!({"ok": false, "error": "bpm unavailable"}));
            return ExitCode::from(1);
        }
        Err(err) => {
            log::warn!("Estimation failed for {:?}: {}", path, err);
            println!("{}", json!({"ok": false, "error": "bpm unavailable"}));
            return ExitCode::from(1);
        }
    };

    let bpm = (estimate.bpm as f64 * 10.0).round() / 10.0;
    let confidence = (estimate.confidence as f64 * 100.0).round() / 100.0;

    println!(
        "{}",
        json!({
            "ok": true,
            "bpm": bpm,
            "bpmInt": estimate.bpm_int(),
            "confidence": confidence,
        })
    );
    ExitCode::SUCCESS
}
