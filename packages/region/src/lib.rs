#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region dataset loading, normalization, and statistics.
//!
//! The pipeline runs once at startup:
//!
//! 1. [`load`] reads the boundary `GeoJSON` (or substitutes a fallback),
//! 2. [`normalize`] reconciles property names and computes bounds via
//!    [`bounds`],
//! 3. [`stats`] attaches per-region election figures.
//!
//! The result is an immutable [`RegionDataset`] that the server shares by
//! handle. [`document`] turns it back into `GeoJSON` for the API.

pub mod aliases;
pub mod bounds;
pub mod document;
pub mod load;
pub mod normalize;
pub mod stats;

pub use election_map_region_models::RegionDataset;

use thiserror::Error;

/// Errors that can occur while reading the region dataset.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Reading the dataset file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but is not a usable feature collection.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
