use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

mod api;
mod config;
mod domain;
mod geometry;
mod io;
mod pipeline;

use config::{FileConfig, PipelineConfig};

/// Consolidate OpenStreetMap and official parking areas into one geocoded dataset
///
/// Examples:
///   # Run with the default Hamburg file set in the working directory
///   parkatlas
///
///   # Custom inputs and a stricter overlap threshold
///   parkatlas --osm-parking export.geojson --overlap-threshold 0.5
///
///   # Skip the per-feature Nominatim lookups (fast, offline)
///   parkatlas --skip-geocoding
///
///   # Use a config file
///   parkatlas --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "parkatlas")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches parkatlas.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// OSM parking export (GeoJSON, EPSG:4326)
    #[arg(long)]
    osm_parking: Option<PathBuf>,

    /// Official public parking areas (GeoPackage, EPSG:25832)
    #[arg(long)]
    official_parking: Option<PathBuf>,

    /// City boundary (GML, EPSG:25832)
    #[arg(long)]
    city_boundary: Option<PathBuf>,

    /// Output GeoPackage path
    #[arg(long)]
    gpkg_output: Option<PathBuf>,

    /// Output XLSX path
    #[arg(long)]
    xlsx_output: Option<PathBuf>,

    /// Remove features overlapping official parking by more than this fraction
    #[arg(long)]
    overlap_threshold: Option<f64>,

    /// Square meters per parking space for capacity estimation
    #[arg(long)]
    area_per_space: Option<f64>,

    /// User agent sent to the Nominatim reverse-geocoding API
    #[arg(long)]
    user_agent: Option<String>,

    /// Skip the reverse-geocoding stage (address columns stay empty)
    #[arg(long)]
    skip_geocoding: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let config = merge_config(args, file_config);

    if config.overlap_threshold < 0.0 || config.overlap_threshold > 1.0 {
        bail!(
            "--overlap-threshold must be between 0 and 1, got {}",
            config.overlap_threshold
        );
    }
    if config.area_per_space <= 0.0 {
        bail!(
            "--area-per-space must be positive, got {}",
            config.area_per_space
        );
    }

    println!("parkatlas - Parking Area Consolidation");
    println!("======================================");
    println!();

    if config.verbose {
        println!("Configuration:");
        println!("  OSM parking: {}", config.osm_parking.display());
        println!("  Official parking: {}", config.official_parking.display());
        println!("  City boundary: {}", config.city_boundary.display());
        println!("  Overlap threshold: {}", config.overlap_threshold);
        println!("  Area per space: {} m2", config.area_per_space);
        println!(
            "  Geocoding: {}",
            if config.skip_geocoding {
                "skipped"
            } else {
                "Nominatim"
            }
        );
        println!("  Outputs: {}, {}", config.gpkg_output.display(), config.xlsx_output.display());
        println!();
    }

    let spinner = create_spinner("Running pipeline...");
    let summary = pipeline::run(&config)?;
    spinner.finish_with_message(format!(
        "Processed {} features [{:.1}s]",
        summary.loaded,
        total_start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Loaded {}, {} inside boundary, {} kept after overlap filter",
        summary.loaded, summary.clipped, summary.kept
    );
    if let Some(ref geocoding) = summary.geocoding {
        println!(
            "Geocoded {} features, {} failed",
            geocoding.resolved, geocoding.failed
        );
        if config.verbose {
            for (index, error) in &geocoding.failures {
                println!("  feature {}: {}", index, error);
            }
        }
    }
    println!();
    println!("Output: {}", config.gpkg_output.display());
    println!("Output: {}", config.xlsx_output.display());

    Ok(())
}

fn merge_config(args: Args, file_config: Option<FileConfig>) -> PipelineConfig {
    let file = file_config.unwrap_or_default();
    let defaults = PipelineConfig::default();

    PipelineConfig {
        osm_parking: args
            .osm_parking
            .or(file.osm_parking)
            .unwrap_or(defaults.osm_parking),
        official_parking: args
            .official_parking
            .or(file.official_parking)
            .unwrap_or(defaults.official_parking),
        city_boundary: args
            .city_boundary
            .or(file.city_boundary)
            .unwrap_or(defaults.city_boundary),
        gpkg_output: args
            .gpkg_output
            .or(file.gpkg_output)
            .unwrap_or(defaults.gpkg_output),
        xlsx_output: args
            .xlsx_output
            .or(file.xlsx_output)
            .unwrap_or(defaults.xlsx_output),
        overlap_threshold: args
            .overlap_threshold
            .or(file.overlap_threshold)
            .unwrap_or(defaults.overlap_threshold),
        area_per_space: args
            .area_per_space
            .or(file.area_per_space)
            .unwrap_or(defaults.area_per_space),
        user_agent: args
            .user_agent
            .or(file.user_agent)
            .unwrap_or(defaults.user_agent),
        skip_geocoding: args.skip_geocoding || file.skip_geocoding.unwrap_or(false),
        verbose: args.verbose || file.verbose.unwrap_or(false),
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
