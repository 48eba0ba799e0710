//! Station catalog updating
//!
//! Batch-applies the tempo estimator to every station in a JSON catalog,
//! writing the estimated BPM back into each station record. A station keeps
//! a `bpm` field if and only if its most recent estimation attempt
//! succeeded; stations with missing, blank, or unresolvable tracks never
//! carry one. Unknown fields and array order pass through untouched, and a
//! single station's failure never aborts the batch.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::EstimatorConfig;
use crate::estimate_bpm;

/// Catalog file path relative to the project root
pub const STATIONS_FILE: &str = "public/media/stations.json";

/// Track paths with this prefix resolve under the public media root
const PUBLIC_MEDIA_PREFIX: &str = "/media/";

/// Errors that can occur while reading or writing the catalog file
#[derive(Debug)]
pub enum CatalogError {
    /// Catalog file I/O error
    Io(String),

    /// Catalog JSON parse or serialize error
    Json(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(msg) => write!(f, "Catalog I/O error: {}", msg),
            CatalogError::Json(msg) => write!(f, "Catalog JSON error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err.to_string())
    }
}

/// Batch updater for a station catalog
#[derive(Debug)]
pub struct CatalogUpdater {
    project_root: PathBuf,
    config: EstimatorConfig,
}

impl CatalogUpdater {
    /// Create an updater rooted at `project_root`
    pub fn new(project_root: impl Into<PathBuf>, config: EstimatorConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    /// Absolute path of the catalog file
    pub fn stations_path(&self) -> PathBuf {
        self.project_root.join(STATIONS_FILE)
    }

    /// Resolve a station's `track` value to a filesystem path
    ///
    /// Paths beginning with `/media/` resolve under `<root>/public/`;
    /// every other path resolves under the project root.
    pub fn resolve_track_path(&self, track: &str) -> PathBuf {
        if track.starts_with(PUBLIC_MEDIA_PREFIX) {
            self.project_root
                .join("public")
                .join(track.trim_start_matches('/'))
        } else {
            self.project_root.join(track.trim_start_matches('/'))
        }
    }

    /// Update every station's `bpm` field and persist the catalog
    ///
    /// Reads the catalog once, processes stations strictly sequentially,
    /// and writes the full object back once with 2-space indentation and a
    /// trailing newline. Per-station progress goes to standard output.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` only for catalog-level failures (unreadable
    /// or malformed catalog file); per-station estimation failures are
    /// logged and skipped.
    pub fn run(&self) -> Result<(), CatalogError> {
        let path = self.stations_path();
        let text = fs::read_to_string(&path)?;
        let mut payload: Value = serde_json::from_str(&text)?;

        println!("Updating station BPM values:");
        if let Some(stations) = payload.get_mut("stations").and_then(Value::as_array_mut) {
            for station in stations {
                self.update_station(station);
            }
        }

        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        fs::write(&path, output)?;

        println!("\nWritten: {}", path.display());
        Ok(())
    }

    /// Update one station record in place
    fn update_station(&self, station: &mut Value) {
        let Some(record) = station.as_object_mut() else {
            return;
        };

        let track = match record.get("track").and_then(Value::as_str) {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            // Missing, blank, or non-string track: a normal "no BPM" case
            _ => {
                record.remove("bpm");
                return;
            }
        };

        let station_id = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();

        let resolved = self.resolve_track_path(&track);
        if !resolved.exists() {
            println!("- {}: track missing ({})", station_id, track);
            record.remove("bpm");
            return;
        }

        match estimate_bpm(&resolved, &self.config) {
            Ok(Some(estimate)) => {
                let bpm = (estimate.bpm as f64 * 10.0).round() / 10.0;
                record.insert("bpm".to_string(), Value::from(bpm));
                println!(
                    "- {}: {:.1} BPM (confidence {:.2})",
                    station_id, estimate.bpm, estimate.confidence
                );
            }
            Ok(None) => {
                record.remove("bpm");
                println!("- {}: bpm unavailable", station_id);
            }
            Err(err) => {
                log::warn!("Estimation failed for {}: {}", station_id, err);
                record.remove("bpm");
                println!("- {}: bpm unavailable", station_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_public_media_path() {
        let updater = CatalogUpdater::new("/srv/radio", EstimatorConfig::default());
        assert_eq!(
            updater.resolve_track_path("/media/tracks/a.mp3"),
            PathBuf::from("/srv/radio/public/media/tracks/a.mp3")
        );
    }

    #[test]
    fn test_resolve_project_relative_path() {
        let updater = CatalogUpdater::new("/srv/radio", EstimatorConfig::default());
        assert_eq!(
            updater.resolve_track_path("assets/b.mp3"),
            PathBuf::from("/srv/radio/assets/b.mp3")
        );
        // Leading slashes outside /media/ are stripped, not treated as absolute
        assert_eq!(
            updater.resolve_track_path("/assets/b.mp3"),
            PathBuf::from("/srv/radio/assets/b.mp3")
        );
    }

    #[test]
    fn test_stations_path() {
        let updater = CatalogUpdater::new("/srv/radio", EstimatorConfig::default());
        assert_eq!(
            updater.stations_path(),
            PathBuf::from("/srv/radio/public/media/stations.json")
        );
    }
}
