use anyhow::{Context, Result, bail};
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::domain::ParkingFeature;

/// Semi-duplicate fixup markers in the OSM export that only complicate the
/// exported schema; dropped on load.
const DROPPED_COLUMNS: [&str; 2] = ["FIXME", "fixme"];

/// Read the OSM parking export (a GeoJSON FeatureCollection in EPSG:4326).
///
/// The `capacity` property may be a JSON number or a numeric string. Any
/// value that cannot be converted aborts the load: a malformed capacity
/// means the source data has to be fixed before rerunning.
pub fn read_osm_parking(path: &Path) -> Result<Vec<ParkingFeature>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read OSM parking export {:?}", path))?;
    parse_osm_parking(&contents)
        .with_context(|| format!("Failed to parse OSM parking export {:?}", path))
}

pub fn parse_osm_parking(contents: &str) -> Result<Vec<ParkingFeature>> {
    let geojson: GeoJson = contents.parse().context("Invalid GeoJSON")?;
    let collection = FeatureCollection::try_from(geojson)
        .context("OSM parking export is not a FeatureCollection")?;

    let mut features = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            bail!("Feature {} has no geometry", index);
        };
        let geometry = geo::Geometry::<f64>::try_from(geometry)
            .with_context(|| format!("Feature {} has an unsupported geometry", index))?;

        let mut attributes = feature.properties.unwrap_or_default();
        for column in DROPPED_COLUMNS {
            attributes.remove(column);
        }
        let capacity = parse_capacity(attributes.remove("capacity"))
            .with_context(|| format!("Feature {} has a malformed capacity", index))?;

        features.push(ParkingFeature::new(geometry, capacity, attributes));
    }
    Ok(features)
}

/// Convert the raw capacity property to a number.
///
/// Values like "ca 7" or "650+" must be cleaned up in the source file first.
fn parse_capacity(value: Option<Value>) -> Result<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let n = n
                .as_f64()
                .filter(|v| v.is_finite())
                .context("capacity is not a finite number")?;
            Ok(Some(n))
        }
        Some(Value::String(s)) => {
            let n: f64 = s
                .trim()
                .parse()
                .with_context(|| format!("cannot convert capacity value {:?} to a number", s))?;
            Ok(Some(n))
        }
        Some(other) => bail!("cannot convert capacity value {} to a number", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"capacity": "12", "surface": "asphalt", "FIXME": "check"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[9.9, 53.5], [9.91, 53.5], [9.91, 53.51], [9.9, 53.51], [9.9, 53.5]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"capacity": null},
                "geometry": {"type": "Point", "coordinates": [9.95, 53.52]}
            }
        ]
    }"#;

    #[test]
    fn parses_features_and_capacity() {
        let features = parse_osm_parking(EXPORT).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].capacity, Some(12.0));
        assert_eq!(features[1].capacity, None);
    }

    #[test]
    fn drops_fixme_columns_keeps_passthrough() {
        let features = parse_osm_parking(EXPORT).unwrap();
        assert!(!features[0].attributes.contains_key("FIXME"));
        assert!(!features[0].attributes.contains_key("capacity"));
        assert_eq!(
            features[0].attributes.get("surface").and_then(|v| v.as_str()),
            Some("asphalt")
        );
    }

    #[test]
    fn numeric_capacity_is_accepted() {
        let export = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"capacity": 7},
                "geometry": {"type": "Point", "coordinates": [9.9, 53.5]}
            }]
        }"#;
        let features = parse_osm_parking(export).unwrap();
        assert_eq!(features[0].capacity, Some(7.0));
    }

    #[test]
    fn malformed_capacity_fails_the_load() {
        let export = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"capacity": "ca 7"},
                "geometry": {"type": "Point", "coordinates": [9.9, 53.5]}
            }]
        }"#;
        let err = parse_osm_parking(export).unwrap_err();
        assert!(format!("{:#}", err).contains("capacity"));
    }
}
