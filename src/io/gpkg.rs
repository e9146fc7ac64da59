use anyhow::{Context, Result, bail};
use geo::{Geometry, Polygon};
use geozero::wkb::GpkgWkb;
use geozero::{CoordDimensions, ToGeo, ToWkb};
use rusqlite::{Connection, OpenFlags, params_from_iter};
use std::path::Path;

use crate::domain::ParkingFeature;
use crate::io::table::{AttributeTable, CellValue};

const FEATURE_TABLE: &str = "parking";
const GEOMETRY_COLUMN: &str = "geom";

/// Read all polygonal geometries from the first feature table of a
/// GeoPackage. Attributes and non-areal geometries are ignored; the official
/// parking dataset is only ever used as an aggregate mask.
pub fn read_polygons(path: &Path) -> Result<Vec<Polygon<f64>>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open GeoPackage {:?}", path))?;

    let (table, column): (String, String) = conn
        .query_row(
            "SELECT c.table_name, g.column_name
             FROM gpkg_contents c
             JOIN gpkg_geometry_columns g ON g.table_name = c.table_name
             WHERE c.data_type = 'features'
             LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .with_context(|| format!("No feature table in GeoPackage {:?}", path))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {}",
        quote_identifier(&column),
        quote_identifier(&table)
    ))?;
    let mut rows = stmt.query([])?;

    let mut polygons = Vec::new();
    while let Some(row) = rows.next()? {
        let blob: Vec<u8> = row.get(0)?;
        let geometry = GpkgWkb(blob)
            .to_geo()
            .with_context(|| format!("Undecodable geometry in table {:?}", table))?;
        match geometry {
            Geometry::Polygon(p) => polygons.push(p),
            Geometry::MultiPolygon(mp) => polygons.extend(mp),
            _ => {}
        }
    }
    Ok(polygons)
}

/// Write the final feature set as a GeoPackage.
///
/// One feature table with the shared attribute layout plus a GPKG WKB
/// geometry column. An existing file at `path` is replaced.
pub fn write_features(path: &Path, features: &[ParkingFeature], srs_id: i32) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to replace existing GeoPackage {:?}", path))?;
    }

    let table = AttributeTable::build(features);

    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to create GeoPackage {:?}", path))?;
    conn.pragma_update(None, "application_id", 0x4750_4B47_i64)?; // "GPKG"
    conn.pragma_update(None, "user_version", 10300_i64)?;

    let tx = conn.transaction()?;
    create_metadata_tables(&tx, srs_id)?;

    let column_defs: String = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!(", {} {}", quote_identifier(name), table.column_type(i)))
        .collect();
    tx.execute_batch(&format!(
        "CREATE TABLE {} (fid INTEGER PRIMARY KEY AUTOINCREMENT, {} BLOB NOT NULL{});",
        quote_identifier(FEATURE_TABLE),
        quote_identifier(GEOMETRY_COLUMN),
        column_defs
    ))?;

    tx.execute(
        "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id)
         VALUES (?1, 'features', ?1, ?2)",
        (FEATURE_TABLE, srs_id),
    )?;
    tx.execute(
        "INSERT INTO gpkg_geometry_columns
         (table_name, column_name, geometry_type_name, srs_id, z, m)
         VALUES (?1, ?2, 'GEOMETRY', ?3, 0, 0)",
        (FEATURE_TABLE, GEOMETRY_COLUMN, srs_id),
    )?;

    let placeholders: Vec<String> = (1..=table.columns.len() + 1)
        .map(|i| format!("?{}", i))
        .collect();
    let column_names: Vec<String> = table
        .columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect();
    let insert_sql = format!(
        "INSERT INTO {} ({}{}{}) VALUES ({})",
        quote_identifier(FEATURE_TABLE),
        quote_identifier(GEOMETRY_COLUMN),
        if column_names.is_empty() { "" } else { ", " },
        column_names.join(", "),
        placeholders.join(", ")
    );

    {
        let mut stmt = tx.prepare(&insert_sql)?;
        for (feature, row) in features.iter().zip(&table.rows) {
            let wkb = feature
                .geometry
                .to_gpkg_wkb(CoordDimensions::xy(), Some(srs_id), Vec::new())
                .context("Failed to encode geometry as GPKG WKB")?;
            let mut params: Vec<rusqlite::types::Value> =
                vec![rusqlite::types::Value::Blob(wkb)];
            params.extend(row.iter().map(cell_to_sql));
            stmt.execute(params_from_iter(params))?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn cell_to_sql(cell: &CellValue) -> rusqlite::types::Value {
    match cell {
        CellValue::Null => rusqlite::types::Value::Null,
        CellValue::Number(n) => rusqlite::types::Value::Real(*n),
        CellValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_metadata_tables(conn: &Connection, srs_id: i32) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE gpkg_spatial_ref_sys (
            srs_name TEXT NOT NULL,
            srs_id INTEGER PRIMARY KEY,
            organization TEXT NOT NULL,
            organization_coordsys_id INTEGER NOT NULL,
            definition TEXT NOT NULL,
            description TEXT
        );
        CREATE TABLE gpkg_contents (
            table_name TEXT PRIMARY KEY,
            data_type TEXT NOT NULL,
            identifier TEXT UNIQUE,
            description TEXT DEFAULT '',
            last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            min_x DOUBLE, min_y DOUBLE, max_x DOUBLE, max_y DOUBLE,
            srs_id INTEGER,
            CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id)
                REFERENCES gpkg_spatial_ref_sys(srs_id)
        );
        CREATE TABLE gpkg_geometry_columns (
            table_name TEXT NOT NULL,
            column_name TEXT NOT NULL,
            geometry_type_name TEXT NOT NULL,
            srs_id INTEGER NOT NULL,
            z TINYINT NOT NULL,
            m TINYINT NOT NULL,
            CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name)
        );
        INSERT INTO gpkg_spatial_ref_sys VALUES
            ('Undefined cartesian SRS', -1, 'NONE', -1, 'undefined', NULL),
            ('Undefined geographic SRS', 0, 'NONE', 0, 'undefined', NULL);",
    )?;

    let (name, definition) = srs_definition(srs_id)?;
    conn.execute(
        "INSERT INTO gpkg_spatial_ref_sys
         (srs_name, srs_id, organization, organization_coordsys_id, definition)
         VALUES (?1, ?2, 'EPSG', ?2, ?3)",
        (name, srs_id, definition),
    )?;
    Ok(())
}

fn srs_definition(srs_id: i32) -> Result<(&'static str, &'static str)> {
    match srs_id {
        4326 => Ok((
            "WGS 84",
            "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",\
             SPHEROID[\"WGS 84\",6378137,298.257223563]],\
             PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]]",
        )),
        25832 => Ok((
            "ETRS89 / UTM zone 32N",
            "PROJCS[\"ETRS89 / UTM zone 32N\",GEOGCS[\"ETRS89\",\
             DATUM[\"European_Terrestrial_Reference_System_1989\",\
             SPHEROID[\"GRS 1980\",6378137,298.257222101]],\
             PRIMEM[\"Greenwich\",0],UNIT[\"degree\",0.0174532925199433]],\
             PROJECTION[\"Transverse_Mercator\"],\
             PARAMETER[\"latitude_of_origin\",0],PARAMETER[\"central_meridian\",9],\
             PARAMETER[\"scale_factor\",0.9996],PARAMETER[\"false_easting\",500000],\
             PARAMETER[\"false_northing\",0],UNIT[\"metre\",1]]",
        )),
        other => bail!("no spatial reference definition for SRS {}", other),
    }
}
