use serde_json::Value;
use std::collections::BTreeSet;

use crate::domain::ParkingFeature;

pub const CAPACITY_COLUMN: &str = "capacity";
pub const GEOMETRY_TYPE_COLUMN: &str = "geometry_type";

/// Geocoded address columns, in export order. The German names are the
/// established schema of the published dataset.
pub const ADDRESS_COLUMNS: [&str; 6] = [
    "plz_reverse_geocoded",
    "adresse_reverse_geocoded",
    "bezirk_reverse_geocoded",
    "stadtteil_reverse_geocoded",
    "stadt_reverse_geocoded",
    "einrichtung_reverse_geocoded",
];

/// One attribute cell: the lowest common denominator of what a GeoPackage
/// column and a spreadsheet cell can both hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s.clone()),
            // Booleans, arrays and objects survive as their JSON text
            other => CellValue::Text(other.to_string()),
        }
    }

    fn from_opt_text(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.is_empty() => CellValue::Text(s.to_string()),
            _ => CellValue::Null,
        }
    }
}

/// Flat attribute table shared by both exporters.
///
/// Column order is deterministic (sorted passthrough attributes, then the
/// derived columns), so exporting the same dataset twice produces identical
/// tables.
#[derive(Debug)]
pub struct AttributeTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl AttributeTable {
    pub fn build(features: &[ParkingFeature]) -> Self {
        let mut passthrough: BTreeSet<&str> = BTreeSet::new();
        for feature in features {
            passthrough.extend(feature.attributes.keys().map(String::as_str));
        }
        let passthrough: Vec<String> = passthrough.into_iter().map(String::from).collect();

        let mut columns = passthrough.clone();
        columns.push(CAPACITY_COLUMN.to_string());
        columns.push(GEOMETRY_TYPE_COLUMN.to_string());
        columns.extend(ADDRESS_COLUMNS.iter().map(|c| c.to_string()));

        let rows = features
            .iter()
            .map(|feature| {
                let mut row: Vec<CellValue> = passthrough
                    .iter()
                    .map(|key| {
                        feature
                            .attributes
                            .get(key)
                            .map(CellValue::from_json)
                            .unwrap_or(CellValue::Null)
                    })
                    .collect();

                row.push(
                    feature
                        .capacity
                        .map(CellValue::Number)
                        .unwrap_or(CellValue::Null),
                );
                row.push(CellValue::from_opt_text(
                    feature.geometry_type.map(|k| k.as_str()),
                ));

                let address = &feature.address;
                let street = address.street_address();
                row.push(CellValue::from_opt_text(address.postcode.as_deref()));
                row.push(CellValue::from_opt_text(Some(street.as_str())));
                row.push(CellValue::from_opt_text(address.city_district.as_deref()));
                row.push(CellValue::from_opt_text(address.suburb.as_deref()));
                row.push(CellValue::from_opt_text(address.city.as_deref()));
                row.push(CellValue::from_opt_text(address.amenity.as_deref()));

                row
            })
            .collect();

        Self { columns, rows }
    }

    /// SQLite column affinity for a column: REAL when every non-null cell is
    /// numeric, TEXT otherwise.
    pub fn column_type(&self, index: usize) -> &'static str {
        let all_numeric = self
            .rows
            .iter()
            .map(|row| &row[index])
            .all(|cell| matches!(cell, CellValue::Null | CellValue::Number(_)));
        if all_numeric { "REAL" } else { "TEXT" }
    }
}
