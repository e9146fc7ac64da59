use crate::domain::ParkingFeature;

/// Fill missing or non-positive capacities from the feature's area.
///
/// A reported positive capacity wins. Zero-area features stay unknown.
/// Everything else gets `floor(area / area_per_space)` spaces.
pub fn estimate_capacities(features: &mut [ParkingFeature], area_per_space: f64) {
    for feature in features.iter_mut() {
        feature.capacity = estimate(feature.capacity, feature.area(), area_per_space);
    }
}

fn estimate(reported: Option<f64>, area: f64, area_per_space: f64) -> Option<f64> {
    if let Some(capacity) = reported
        && capacity > 0.0
    {
        return Some(capacity);
    }
    if area == 0.0 {
        return None;
    }
    Some((area / area_per_space).floor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point, polygon};
    use serde_json::Map;

    fn areal_feature(size: f64, capacity: Option<f64>) -> ParkingFeature {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: size, y: 0.0),
            (x: size, y: size),
            (x: 0.0, y: size),
        ];
        ParkingFeature::new(Geometry::Polygon(square), capacity, Map::new())
    }

    #[test]
    fn reported_capacity_wins() {
        let mut features = vec![areal_feature(100.0, Some(7.0))];
        estimate_capacities(&mut features, 25.0);
        assert_eq!(features[0].capacity, Some(7.0));
    }

    #[test]
    fn estimates_from_area() {
        // 30x10 m lot at 25 m2 per space: 12 spaces
        let lot = polygon![
            (x: 0.0, y: 0.0),
            (x: 30.0, y: 0.0),
            (x: 30.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let mut features = vec![ParkingFeature::new(
            Geometry::Polygon(lot),
            None,
            Map::new(),
        )];
        estimate_capacities(&mut features, 25.0);
        assert_eq!(features[0].capacity, Some(12.0));
    }

    #[test]
    fn non_positive_capacity_is_re_estimated() {
        let mut features = vec![
            areal_feature(10.0, Some(0.0)),
            areal_feature(10.0, Some(-3.0)),
        ];
        estimate_capacities(&mut features, 25.0);
        assert_eq!(features[0].capacity, Some(4.0));
        assert_eq!(features[1].capacity, Some(4.0));
    }

    #[test]
    fn point_without_capacity_stays_unknown() {
        let mut features = vec![ParkingFeature::new(
            Geometry::Point(Point::new(0.0, 0.0)),
            None,
            Map::new(),
        )];
        estimate_capacities(&mut features, 25.0);
        assert_eq!(features[0].capacity, None);
    }

    #[test]
    fn estimates_are_non_negative_integers() {
        let mut features = vec![areal_feature(3.0, None)]; // 9 m2, under one space
        estimate_capacities(&mut features, 25.0);
        let capacity = features[0].capacity.unwrap();
        assert_eq!(capacity, 0.0);
        assert_eq!(capacity.fract(), 0.0);
    }
}
