pub mod projection;

pub use projection::Utm32Projector;

use geo::{BooleanOps, Geometry, Intersects, MultiPolygon, Polygon, unary_union};

/// View an areal geometry as a MultiPolygon. Returns `None` for points,
/// lines and other non-areal types.
pub fn as_multi_polygon(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        _ => None,
    }
}

/// Union a set of polygons into one (multi)polygon mask.
pub fn union_polygons(polygons: &[Polygon<f64>]) -> MultiPolygon<f64> {
    unary_union(polygons.iter())
}

/// Clip a geometry to a boundary mask.
///
/// Areal geometries keep only the portion intersecting the mask; a clipped
/// result that collapses to nothing drops the feature (`None`). Points and
/// other non-areal geometries cannot be cut and are kept unchanged iff they
/// intersect the mask.
pub fn clip_to_boundary(
    geometry: &Geometry<f64>,
    boundary: &MultiPolygon<f64>,
) -> Option<Geometry<f64>> {
    match as_multi_polygon(geometry) {
        Some(mp) => {
            let clipped = boundary.intersection(&mp);
            if clipped.0.is_empty() {
                None
            } else if clipped.0.len() == 1 {
                Some(Geometry::Polygon(clipped.0.into_iter().next().unwrap()))
            } else {
                Some(Geometry::MultiPolygon(clipped))
            }
        }
        None => {
            if geometry.intersects(boundary) {
                Some(geometry.clone())
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Point, polygon};

    fn unit_mask() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 0.0, y: 100.0),
        ]])
    }

    #[test]
    fn clip_keeps_inner_polygon() {
        let inner = Geometry::Polygon(polygon![
            (x: 10.0, y: 10.0),
            (x: 20.0, y: 10.0),
            (x: 20.0, y: 20.0),
            (x: 10.0, y: 20.0),
        ]);
        let clipped = clip_to_boundary(&inner, &unit_mask()).unwrap();
        assert!((clipped.unsigned_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn clip_cuts_straddling_polygon() {
        let straddling = Geometry::Polygon(polygon![
            (x: 90.0, y: 0.0),
            (x: 110.0, y: 0.0),
            (x: 110.0, y: 10.0),
            (x: 90.0, y: 10.0),
        ]);
        let clipped = clip_to_boundary(&straddling, &unit_mask()).unwrap();
        assert!((clipped.unsigned_area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn clip_drops_outside_polygon() {
        let outside = Geometry::Polygon(polygon![
            (x: 200.0, y: 200.0),
            (x: 210.0, y: 200.0),
            (x: 210.0, y: 210.0),
            (x: 200.0, y: 210.0),
        ]);
        assert!(clip_to_boundary(&outside, &unit_mask()).is_none());
    }

    #[test]
    fn clip_keeps_inner_point_drops_outer() {
        let inner = Geometry::Point(Point::new(50.0, 50.0));
        let outer = Geometry::Point(Point::new(150.0, 50.0));
        assert!(clip_to_boundary(&inner, &unit_mask()).is_some());
        assert!(clip_to_boundary(&outer, &unit_mask()).is_none());
    }

    #[test]
    fn union_merges_touching_squares() {
        let a = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let b = polygon![
            (x: 10.0, y: 0.0),
            (x: 20.0, y: 0.0),
            (x: 20.0, y: 10.0),
            (x: 10.0, y: 10.0),
        ];
        let union = union_polygons(&[a, b]);
        assert!((union.unsigned_area() - 200.0).abs() < 1e-6);
    }
}
