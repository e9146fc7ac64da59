use anyhow::{Context, Result};
use geozero::ToWkt;
use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::domain::ParkingFeature;
use crate::io::table::{AttributeTable, CellValue};

/// Write the final feature set as an XLSX spreadsheet.
///
/// Tabular formats cannot hold native geometry, so the geometry lands in a
/// trailing `geometry` column as well-known text.
pub fn write_features(path: &Path, features: &[ParkingFeature]) -> Result<()> {
    let table = AttributeTable::build(features);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name)?;
    }
    let geometry_col = table.columns.len() as u16;
    sheet.write_string(0, geometry_col, "geometry")?;

    for (index, (feature, row)) in features.iter().zip(&table.rows).enumerate() {
        let row_idx = index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Null => {}
                CellValue::Number(n) => {
                    sheet.write_number(row_idx, col as u16, *n)?;
                }
                CellValue::Text(s) => {
                    sheet.write_string(row_idx, col as u16, s)?;
                }
            }
        }
        let wkt = feature
            .geometry
            .to_wkt()
            .context("Failed to serialize geometry as WKT")?;
        sheet.write_string(row_idx, geometry_col, &wkt)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write spreadsheet {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point};
    use serde_json::Map;

    #[test]
    fn writes_a_nonempty_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.xlsx");

        let mut feature = ParkingFeature::new(
            Geometry::Point(Point::new(9.99, 53.55)),
            Some(3.0),
            Map::new(),
        );
        feature.geometry_type = Some(crate::domain::GeometryKind::Punkt);

        write_features(&path, &[feature]).unwrap();
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn empty_dataset_still_produces_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_features(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
