//! Bounding box and centroid reduction over position sequences.

use election_map_region_models::{BoundingBox, Centroid, Position};

/// Computes the bounding box of `positions` in a single pass.
///
/// Returns `None` for an empty sequence.
#[must_use]
pub fn bounding_box<I>(positions: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = Position>,
{
    positions
        .into_iter()
        .fold(None, |acc: Option<BoundingBox>, position| {
            Some(acc.map_or_else(
                || BoundingBox::from_position(position),
                |mut bbox| {
                    bbox.extend(position);
                    bbox
                },
            ))
        })
}

/// Computes the bounding box of `positions` and its midpoint.
#[must_use]
pub fn reduce<I>(positions: I) -> (Option<BoundingBox>, Option<Centroid>)
where
    I: IntoIterator<Item = Position>,
{
    let bbox = bounding_box(positions);
    (bbox, bbox.as_ref().map(BoundingBox::centroid))
}

/// Coordinate-wise union of any number of optional boxes.
#[must_use]
pub fn union_all<'a, I>(boxes: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Option<BoundingBox>>,
{
    boxes
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<BoundingBox>, bbox| {
            Some(acc.map_or(*bbox, |a| a.union(bbox)))
        })
}
