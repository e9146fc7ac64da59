use geo::{Area, BooleanOps, MultiPolygon};

use crate::domain::ParkingFeature;
use crate::geometry;

/// Drop features whose overlap with the official public-parking mask exceeds
/// `threshold` as a fraction of their own area.
///
/// Zero-area features (points) have no meaningful area overlap; instead of a
/// divide-by-zero they are always kept.
pub fn filter_public_overlap(
    features: Vec<ParkingFeature>,
    official: &MultiPolygon<f64>,
    threshold: f64,
) -> Vec<ParkingFeature> {
    features
        .into_iter()
        .filter(|feature| {
            overlap_ratio(feature, official).is_none_or(|ratio| ratio <= threshold)
        })
        .collect()
}

/// Fraction of the feature's own area covered by the mask; `None` for
/// zero-area features.
pub fn overlap_ratio(feature: &ParkingFeature, official: &MultiPolygon<f64>) -> Option<f64> {
    let own_area = feature.area();
    if own_area == 0.0 {
        return None;
    }
    let mp = geometry::as_multi_polygon(&feature.geometry)?;
    let intersection_area = official.intersection(&mp).unsigned_area();
    Some(intersection_area / own_area)
}
