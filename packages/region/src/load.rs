//! Startup loading of the region dataset.
//!
//! The dataset file is read exactly once. A missing or unparsable file is
//! not fatal: a single-region fallback is substituted so the server can
//! still start.

use std::path::Path;

use election_map_region_models::RegionDataset;
use rand::Rng;
use serde_json::Value;

use crate::RegionError;
use crate::normalize::normalize_dataset;
use crate::stats::attach_stats;

/// Default location of the region boundary file.
pub const DEFAULT_REGIONS_PATH: &str = "data/regions.geojson";

/// Reads and parses a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`RegionError`] if the file cannot be read, is not valid JSON,
/// or is not a `FeatureCollection`.
pub fn read_feature_collection(path: &Path) -> Result<Value, RegionError> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;

    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => Ok(value),
        other => Err(RegionError::Conversion {
            message: format!(
                "expected a FeatureCollection, found {}",
                other.unwrap_or("no type")
            ),
        }),
    }
}

/// Raw fallback collection used when the dataset file is unavailable.
#[must_use]
pub fn fallback_feature_collection() -> Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [38.7, 9.0], [39.0, 9.0], [39.0, 9.3], [38.7, 9.3], [38.7, 9.0]
                ]],
            },
            "properties": {
                "name_en": "Addis Ababa",
                "name_am": "አዲስ አበባ",
                "code": "ET-AA",
            },
        }],
    })
}

/// Loads and normalizes the dataset at `path`, falling back to the
/// single-region dataset on any read or parse failure.
#[must_use]
pub fn load_normalized(path: &Path) -> RegionDataset {
    let raw = match read_feature_collection(path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!(
                "Failed to load regions from {}: {e}. Using fallback dataset",
                path.display()
            );
            fallback_feature_collection()
        }
    };

    normalize_dataset(&raw)
}

/// Runs the full startup pipeline: load, normalize, attach statistics.
#[must_use]
pub fn build_dataset<R: Rng + ?Sized>(path: &Path, rng: &mut R) -> RegionDataset {
    log::info!("Loading regions from {}", path.display());
    let dataset = attach_stats(load_normalized(path), rng);

    match dataset.bbox {
        Some(bbox) => log::info!(
            "Loaded {} regions, bounds {:?}",
            dataset.len(),
            bbox.to_bbox_array()
        ),
        None => log::info!("Loaded {} regions without bounds", dataset.len()),
    }

    dataset
}
