pub mod capacity;
pub mod classify;
pub mod filter;
pub mod geocode;

pub use geocode::GeocodeSummary;

use anyhow::{Context, Result};
use geo::BooleanOps;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::ReverseGeocoder;
use crate::config::PipelineConfig;
use crate::domain::ParkingFeature;
use crate::geometry::{self, Utm32Projector};
use crate::io;

/// Counts reported after a full pipeline run.
#[derive(Debug)]
pub struct RunSummary {
    /// Features read from the OSM export.
    pub loaded: usize,
    /// Features remaining after the clip to the city boundary.
    pub clipped: usize,
    /// Features remaining after the public-overlap filter.
    pub kept: usize,
    /// `None` when geocoding was skipped.
    pub geocoding: Option<GeocodeSummary>,
}

/// Execute the whole pipeline: load, clip, filter, estimate, classify,
/// geocode, export. Strictly linear; any failure outside an individual
/// geocode request aborts the run.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    // Load all three sources and harmonize CRSes
    let raw = io::geojson::read_osm_parking(&config.osm_parking)?;
    let loaded = raw.len();

    let official_polygons = io::gpkg::read_polygons(&config.official_parking)
        .context("Failed to load official parking dataset")?;
    let boundary_polygons = io::gml::read_boundary(&config.city_boundary)?;
    let boundary = geometry::union_polygons(&boundary_polygons);

    let projector = Utm32Projector::new();
    let mut features: Vec<ParkingFeature> = raw
        .into_iter()
        .filter_map(|mut feature| {
            feature.geometry = projector.geometry_to_metric(&feature.geometry);
            geometry::clip_to_boundary(&feature.geometry, &boundary).map(|clipped| {
                feature.geometry = clipped;
                feature
            })
        })
        .collect();
    let clipped = features.len();

    // The official dataset is only used in aggregate, so clipping it to the
    // boundary is the same as clipping its union
    let official_mask = boundary.intersection(&geometry::union_polygons(&official_polygons));

    if config.verbose {
        println!(
            "  Loaded {} OSM features ({} inside boundary), {} official parking polygons",
            loaded,
            clipped,
            official_polygons.len()
        );
    }

    features = filter::filter_public_overlap(features, &official_mask, config.overlap_threshold);
    let kept = features.len();
    if config.verbose {
        println!(
            "  {} features left after removing overlap > {:.0}%",
            kept,
            config.overlap_threshold * 100.0
        );
    }

    capacity::estimate_capacities(&mut features, config.area_per_space);
    classify::classify_geometries(&mut features);

    // Back to geographic coordinates for geocoding; the exports stay in
    // EPSG:4326 as well
    for feature in features.iter_mut() {
        feature.geometry = projector.geometry_to_geographic(&feature.geometry);
    }

    let geocoding = if config.skip_geocoding {
        None
    } else {
        let geocoder = ReverseGeocoder::new(&config.user_agent)?;
        let bar = ProgressBar::new(features.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.green} {pos}/{len} geocoded {msg}").unwrap(),
        );
        let summary = geocode::geocode_features(&mut features, |lat, lon| {
            let result = geocoder.reverse(lat, lon);
            bar.inc(1);
            result
        });
        bar.finish();
        Some(summary)
    };

    io::gpkg::write_features(&config.gpkg_output, &features, 4326)?;
    io::xlsx::write_features(&config.xlsx_output, &features)?;

    Ok(RunSummary {
        loaded,
        clipped,
        kept,
        geocoding,
    })
}
