use crate::domain::{GeometryKind, ParkingFeature};

/// Label every feature by areal extent: `Polygon` when its area is positive,
/// `Punkt` otherwise. Purely derived, no other state changes.
pub fn classify_geometries(features: &mut [ParkingFeature]) {
    for feature in features.iter_mut() {
        feature.geometry_type = Some(if feature.area() > 0.0 {
            GeometryKind::Polygon
        } else {
            GeometryKind::Punkt
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point, polygon};
    use serde_json::Map;

    #[test]
    fn polygons_and_points_are_labelled() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let mut features = vec![
            ParkingFeature::new(Geometry::Polygon(square), None, Map::new()),
            ParkingFeature::new(Geometry::Point(Point::new(1.0, 1.0)), None, Map::new()),
        ];
        classify_geometries(&mut features);
        assert_eq!(features[0].geometry_type, Some(GeometryKind::Polygon));
        assert_eq!(features[1].geometry_type, Some(GeometryKind::Punkt));
    }
}
