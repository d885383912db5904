//! Serves a [`RegionDataset`] as a `GeoJSON` `FeatureCollection`.
//!
//! Each feature keeps its source geometry and carries canonical properties
//! plus a `bbox`. The collection's `bbox` is the dataset-wide bound.

use election_map_region_models::{RegionDataset, RegionFeature};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use serde_json::Value;

/// Builds the served document for the whole dataset.
#[must_use]
pub fn to_feature_collection(dataset: &RegionDataset) -> FeatureCollection {
    FeatureCollection {
        bbox: dataset.bbox.map(|b| b.to_bbox_array().to_vec()),
        features: dataset.features.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

/// Builds the served `GeoJSON` feature for one region.
#[must_use]
pub fn to_feature(region: &RegionFeature) -> Feature {
    let geometry = region.geometry.clone().and_then(|g| {
        Geometry::from_json_value(g)
            .map_err(|e| log::debug!("Serving '{}' without geometry: {e}", region.name_en))
            .ok()
    });

    Feature {
        bbox: region.bbox.map(|b| b.to_bbox_array().to_vec()),
        geometry,
        id: region.code.clone().map(Id::String),
        properties: Some(properties(region)),
        foreign_members: None,
    }
}

fn properties(region: &RegionFeature) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("nameEn".to_string(), Value::from(region.name_en.clone()));
    props.insert("nameAm".to_string(), Value::from(region.name_am.clone()));
    props.insert("code".to_string(), Value::from(region.code.clone()));
    props.insert(
        "centroid".to_string(),
        region
            .centroid
            .map_or(Value::Null, |c| serde_json::json!([c.lng, c.lat])),
    );

    if let Some(stats) = region.stats {
        props.insert(
            "registeredVoters".to_string(),
            Value::from(stats.registered_voters),
        );
        props.insert("validVotes".to_string(), Value::from(stats.valid_votes));
        props.insert("turnoutPct".to_string(), Value::from(stats.turnout_pct));
        props.insert(
            "winnerParty".to_string(),
            Value::from(stats.winner.to_string()),
        );
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_dataset;
    use crate::stats::attach_stats;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[test]
    fn document_carries_bounds_and_canonical_properties() {
        let raw = json!({
            "features": [{
                "properties": { "name_en": "AddisAbeba", "HASC_1": "ET.AA" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[38.7, 9.0], [39.0, 9.0], [39.0, 9.3], [38.7, 9.0]]],
                },
            }],
        });
        let dataset = attach_stats(normalize_dataset(&raw), &mut StdRng::seed_from_u64(5));
        let doc = serde_json::to_value(to_feature_collection(&dataset)).unwrap();

        assert_eq!(doc["type"], "FeatureCollection");
        assert_eq!(doc["bbox"], json!([38.7, 9.0, 39.0, 9.3]));

        let feature = &doc["features"][0];
        assert_eq!(feature["id"], "ET-AA");
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(feature["properties"]["nameEn"], "Addis Ababa");
        assert_eq!(feature["properties"]["nameAm"], Value::Null);
        assert!(feature["properties"]["turnoutPct"].is_f64());
        assert!(feature["properties"]["winnerParty"].is_string());
    }

    #[test]
    fn feature_without_geometry_serves_null_geometry() {
        let dataset = normalize_dataset(&json!({ "features": [{ "properties": {} }] }));
        let doc = serde_json::to_value(to_feature_collection(&dataset)).unwrap();

        assert_eq!(doc["features"][0]["geometry"], Value::Null);
        assert_eq!(doc["features"][0]["properties"]["centroid"], Value::Null);
        assert!(doc["bbox"].is_null());
    }
}
