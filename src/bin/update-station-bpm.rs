//! Batch-update station BPM values in the catalog file
//!
//! Usage:
//!   update-station-bpm
//!
//! Reads `public/media/stations.json` under the current directory, runs the
//! tempo estimator for every station with a resolvable track, and writes
//! the catalog back with updated `bpm` fields. Individual station failures
//! are logged and skipped; only a catalog-level failure exits non-zero.

use std::process::ExitCode;

use cadence_dsp::catalog::CatalogUpdater;
use cadence_dsp::EstimatorConfig;

fn main() -> ExitCode {
    env_logger::init();

    let project_root = match std::env::current_dir() {
        Ok(root) => root,
        Err(err) => {
            eprintln!("Cannot determine project root: {}", err);
            return ExitCode::from(1);
        }
    };

    let updater = CatalogUpdater::new(project_root, EstimatorConfig::default());
    match updater.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Catalog update failed: {}", err);
            ExitCode::from(1)
        }
    }
}
