use geo::{Area, Geometry};
use serde_json::{Map, Value};

use crate::api::NominatimAddress;

/// Classification of a parking feature by areal extent.
///
/// Point observations (single parking spots mapped as nodes) have zero area
/// and are labelled `Punkt`; everything else is `Polygon`. The German labels
/// are kept because downstream consumers of the exported files expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    Punkt,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Punkt => "Punkt",
        }
    }
}

/// One parking-area observation flowing through the pipeline.
///
/// The geometry is in EPSG:25832 (metric) during filtering and capacity
/// estimation and in EPSG:4326 (geographic) from the geocoding stage onwards.
/// `attributes` carries all source properties that the pipeline does not
/// interpret itself; they are passed through to both exports untouched.
#[derive(Debug, Clone)]
pub struct ParkingFeature {
    pub geometry: Geometry<f64>,
    /// Number of parking spaces; `None` when unknown.
    pub capacity: Option<f64>,
    pub geometry_type: Option<GeometryKind>,
    pub address: NominatimAddress,
    pub attributes: Map<String, Value>,
}

impl ParkingFeature {
    pub fn new(
        geometry: Geometry<f64>,
        capacity: Option<f64>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            geometry,
            capacity,
            geometry_type: None,
            address: NominatimAddress::default(),
            attributes,
        }
    }

    /// Planar area of the geometry in the units of the current CRS.
    ///
    /// Only meaningful while the feature is in the metric CRS; points and
    /// lines report zero.
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }
}
