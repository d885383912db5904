#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative region types shared by the region pipeline and the API.
//!
//! A [`RegionDataset`] is produced once at startup from a static `GeoJSON`
//! file and held read-only for the lifetime of the server. The derived
//! geometry fields ([`BoundingBox`], [`Centroid`]) are recomputed on every
//! load and never persisted.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A longitude/latitude pair in the dataset's datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// An axis-aligned bounding box in longitude/latitude.
///
/// Always satisfies `min_lng <= max_lng` and `min_lat <= max_lat`. An empty
/// position set has no bounding box; callers model that as
/// `Option<BoundingBox>`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub min_lng: f64,
    /// Southern latitude boundary.
    pub min_lat: f64,
    /// Eastern longitude boundary.
    pub max_lng: f64,
    /// Northern latitude boundary.
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a zero-area box around a single position.
    #[must_use]
    pub const fn from_position(position: Position) -> Self {
        Self {
            min_lng: position.lng,
            min_lat: position.lat,
            max_lng: position.lng,
            max_lat: position.lat,
        }
    }

    /// Grows the box to include `position`.
    pub const fn extend(&mut self, position: Position) {
        self.min_lng = self.min_lng.min(position.lng);
        self.min_lat = self.min_lat.min(position.lat);
        self.max_lng = self.max_lng.max(position.lng);
        self.max_lat = self.max_lat.max(position.lat);
    }

    /// Returns the coordinate-wise union of two boxes.
    #[must_use]
    pub const fn union(&self, other: &Self) -> Self {
        Self {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Whether `position` lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_lng..=self.max_lng).contains(&position.lng)
            && (self.min_lat..=self.max_lat).contains(&position.lat)
    }

    /// Midpoint of the box's extremes.
    ///
    /// This is not an area-weighted centroid. It is good enough for label
    /// placement and viewport fitting.
    #[must_use]
    pub fn centroid(&self) -> Centroid {
        Centroid {
            lng: f64::midpoint(self.min_lng, self.max_lng),
            lat: f64::midpoint(self.min_lat, self.max_lat),
        }
    }

    /// Returns the box in `GeoJSON` `bbox` order: `[west, south, east, north]`.
    #[must_use]
    pub const fn to_bbox_array(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }
}

/// Midpoint of a [`BoundingBox`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Longitude.
    pub lng: f64,
    /// Latitude.
    pub lat: f64,
}

/// Parties a region's plurality winner is drawn from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Party {
    /// Prosperity Party.
    #[serde(rename = "Prosperity")]
    #[strum(serialize = "Prosperity")]
    Prosperity,
    /// Coalition of opposition parties.
    #[serde(rename = "Opposition Coalition")]
    #[strum(serialize = "Opposition Coalition")]
    OppositionCoalition,
    /// Independent candidates.
    #[serde(rename = "Independent")]
    #[strum(serialize = "Independent")]
    Independent,
}

impl Party {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Prosperity, Self::OppositionCoalition, Self::Independent]
    }
}

/// Per-region election figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    /// Number of registered voters.
    pub registered_voters: u64,
    /// Number of valid votes cast. Never exceeds `registered_voters`.
    pub valid_votes: u64,
    /// `valid_votes / registered_voters * 100`, or `0` with no registered
    /// voters.
    pub turnout_pct: f64,
    /// Plurality winner.
    pub winner: Party,
}

impl RegionStats {
    /// Builds stats from raw counts, computing the turnout percentage.
    ///
    /// Returns `None` if `valid_votes` exceeds `registered_voters`.
    #[must_use]
    pub fn new(registered_voters: u64, valid_votes: u64, winner: Party) -> Option<Self> {
        if valid_votes > registered_voters {
            return None;
        }

        Some(Self {
            registered_voters,
            valid_votes,
            turnout_pct: turnout_pct(registered_voters, valid_votes),
            winner,
        })
    }
}

/// Turnout percentage, `0.0` when there are no registered voters.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn turnout_pct(registered_voters: u64, valid_votes: u64) -> f64 {
    if registered_voters == 0 {
        0.0
    } else {
        valid_votes as f64 / registered_voters as f64 * 100.0
    }
}

/// A normalized administrative region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFeature {
    /// Source properties exactly as read from the dataset file.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Source geometry as read from the dataset file.
    pub geometry: Option<serde_json::Value>,
    /// Canonical English display name.
    pub name_en: String,
    /// Canonical local-script (Amharic) name.
    pub name_am: Option<String>,
    /// Region identifier code (e.g. `"ET-AA"`).
    pub code: Option<String>,
    /// Bounds of every position in the geometry, holes included.
    pub bbox: Option<BoundingBox>,
    /// Midpoint of [`Self::bbox`].
    pub centroid: Option<Centroid>,
    /// Election figures, attached after normalization.
    pub stats: Option<RegionStats>,
}

/// An ordered collection of regions with a dataset-wide bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDataset {
    /// Regions in source order.
    pub features: Vec<RegionFeature>,
    /// Union of every feature's bounding box.
    pub bbox: Option<BoundingBox>,
}

impl RegionDataset {
    /// Number of regions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the dataset has no regions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
