//! Normalizes raw `GeoJSON` features into [`RegionFeature`] values.
//!
//! Upstream boundary files disagree on property naming, so canonical fields
//! are resolved through the alias table in [`crate::aliases`]. Geometry is
//! flattened to a plain position list for bounds computation only; the
//! original geometry is kept untouched for serving.

use election_map_region_models::{Position, RegionDataset, RegionFeature};
use serde_json::{Map, Value};

use crate::aliases::aliases;
use crate::bounds;

/// Normalizes a whole `FeatureCollection`.
///
/// Features keep their source order. A missing or non-array `features`
/// member yields an empty dataset with no bound.
#[must_use]
pub fn normalize_dataset(raw: &Value) -> RegionDataset {
    let Some(features) = raw.get("features").and_then(Value::as_array) else {
        log::debug!("Dataset has no features array");
        return RegionDataset::default();
    };

    let mut all_positions = Vec::new();
    let features: Vec<RegionFeature> = features
        .iter()
        .map(|feature| {
            let positions = feature
                .get("geometry")
                .map(flatten_geometry)
                .unwrap_or_default();
            let normalized = build_feature(feature, &positions);
            all_positions.extend(positions);
            normalized
        })
        .collect();

    let bbox = bounds::bounding_box(all_positions);

    log::debug!("Normalized {} region features", features.len());

    RegionDataset { features, bbox }
}

/// Normalizes a single `GeoJSON` feature.
///
/// Never fails: missing properties yield an `"Unknown"` name and missing or
/// unsupported geometry yields no bounds.
#[must_use]
pub fn normalize_feature(feature: &Value) -> RegionFeature {
    let positions = feature
        .get("geometry")
        .map(flatten_geometry)
        .unwrap_or_default();
    build_feature(feature, &positions)
}

fn build_feature(feature: &Value, positions: &[Position]) -> RegionFeature {
    let properties: Map<String, Value> = feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let geometry = feature.get("geometry").filter(|g| !g.is_null()).cloned();

    let table = aliases();
    let (bbox, centroid) = bounds::reduce(positions.iter().copied());

    RegionFeature {
        name_en: table.resolve_name_en(&properties),
        name_am: table.resolve_name_am(&properties),
        code: table.resolve_code(&properties),
        properties,
        geometry,
        bbox,
        centroid,
        stats: None,
    }
}

/// Flattens a `Polygon` or `MultiPolygon` geometry into its positions.
///
/// Ring structure is discarded, so interior rings contribute to the bounds.
/// Any other geometry type yields an empty list. Malformed positions are
/// skipped.
#[must_use]
pub fn flatten_geometry(geometry: &Value) -> Vec<Position> {
    let coordinates = geometry.get("coordinates");

    match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => coordinates.map(flatten_polygon).unwrap_or_default(),
        Some("MultiPolygon") => coordinates
            .and_then(Value::as_array)
            .map(|polygons| polygons.iter().flat_map(flatten_polygon).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Concatenates every ring's positions.
fn flatten_polygon(rings: &Value) -> Vec<Position> {
    rings
        .as_array()
        .map(|rings| {
            rings
                .iter()
                .filter_map(Value::as_array)
                .flatten()
                .filter_map(parse_position)
                .collect()
        })
        .unwrap_or_default()
}

/// Parses `[lng, lat]` or `[lng, lat, alt]`.
fn parse_position(value: &Value) -> Option<Position> {
    let coords = value.as_array()?;
    if !(2..=3).contains(&coords.len()) {
        return None;
    }

    let lng = coords[0].as_f64()?;
    let lat = coords[1].as_f64()?;
    if !lng.is_finite() || !lat.is_finite() {
        return None;
    }

    Some(Position::new(lng, lat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(min: f64, max: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]],
        })
    }

    #[test]
    fn feature_without_geometry_has_no_bounds() {
        let feature = json!({ "type": "Feature", "properties": { "name_en": "AddisAbeba" } });
        let normalized = normalize_feature(&feature);

        assert_eq!(normalized.name_en, "Addis Ababa");
        assert_eq!(normalized.bbox, None);
        assert_eq!(normalized.centroid, None);
        assert_eq!(normalized.geometry, None);
        assert_eq!(normalized.stats, None);
    }

    #[test]
    fn dataset_bound_is_union_of_feature_bounds() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": {}, "geometry": square(0.0, 1.0) },
                { "type": "Feature", "properties": {}, "geometry": square(2.0, 3.0) },
            ],
        });
        let dataset = normalize_dataset(&raw);

        assert_eq!(dataset.bbox.unwrap().to_bbox_array(), [0.0, 0.0, 3.0, 3.0]);

        let per_feature: Vec<_> = dataset.features.iter().map(|f| f.bbox).collect();
        assert_eq!(bounds::union_all(&per_feature), dataset.bbox);
    }

    #[test]
    fn feature_order_is_preserved() {
        let raw = json!({
            "features": [
                { "properties": { "name_en": "Tigray" } },
                { "properties": { "name_en": "Afar" } },
                "not a feature",
                { "properties": { "name_en": "Amhara" } },
            ],
        });
        let names: Vec<_> = normalize_dataset(&raw)
            .features
            .into_iter()
            .map(|f| f.name_en)
            .collect();

        assert_eq!(names, ["Tigray", "Afar", "Unknown", "Amhara"]);
    }

    #[test]
    fn missing_features_yield_empty_dataset() {
        assert_eq!(normalize_dataset(&json!({})), RegionDataset::default());
        assert_eq!(normalize_dataset(&Value::Null), RegionDataset::default());

        let empty = normalize_dataset(&json!({ "features": [] }));
        assert!(empty.is_empty());
        assert_eq!(empty.bbox, None);
    }

    #[test]
    fn polygon_holes_contribute_to_bounds() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
                [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
            ],
        });

        assert_eq!(flatten_geometry(&geometry).len(), 9);
    }

    #[test]
    fn multipolygon_flattens_every_polygon() {
        let feature = json!({
            "properties": { "NAME_1": "Somali", "HASC_1": "ET.SO" },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[40.0, 5.0], [41.0, 5.0], [41.0, 6.0], [40.0, 5.0]]],
                    [[[44.0, 7.0], [45.0, 7.0], [45.0, 8.0], [44.0, 7.0]]],
                ],
            },
        });
        let normalized = normalize_feature(&feature);

        assert_eq!(normalized.name_en, "Somali");
        assert_eq!(normalized.code.as_deref(), Some("ET-SO"));
        assert_eq!(
            normalized.bbox.unwrap().to_bbox_array(),
            [40.0, 5.0, 45.0, 8.0]
        );
        let centroid = normalized.centroid.unwrap();
        assert!((centroid.lng - 42.5).abs() < 1e-12);
        assert!((centroid.lat - 6.5).abs() < 1e-12);
    }

    #[test]
    fn unsupported_geometry_yields_no_positions() {
        let point = json!({ "type": "Point", "coordinates": [38.7, 9.0] });
        let line = json!({ "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] });

        assert!(flatten_geometry(&point).is_empty());
        assert!(flatten_geometry(&line).is_empty());
    }

    #[test]
    fn malformed_positions_are_skipped() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[1.0], ["a", 2.0], [1.0, 2.0, 3.0, 4.0], [5.0, 6.0], [7.0, 8.0, 100.0]]],
        });
        let positions = flatten_geometry(&geometry);

        assert_eq!(positions, vec![Position::new(5.0, 6.0), Position::new(7.0, 8.0)]);
    }

    #[test]
    fn entirely_malformed_geometry_has_no_bounds() {
        let feature = json!({
            "properties": { "name_en": "Afar" },
            "geometry": { "type": "Polygon", "coordinates": [[["x", "y"], [null, 1.0]]] },
        });
        let normalized = normalize_feature(&feature);

        assert_eq!(normalized.bbox, None);
        assert_eq!(normalized.centroid, None);
        assert!(normalized.geometry.is_some());
    }

    #[test]
    fn normalizing_a_canonical_name_is_idempotent() {
        let first = normalize_feature(&json!({ "properties": { "name_en": "BenshangulGumaz" } }));
        let second = normalize_feature(&json!({ "properties": { "name_en": first.name_en } }));

        assert_eq!(second.name_en, "Benishangul-Gumuz");
    }
}
