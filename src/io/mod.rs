pub mod geojson;
pub mod gml;
pub mod gpkg;
pub mod table;
pub mod xlsx;
