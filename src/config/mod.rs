use serde::Deserialize;
use std::path::PathBuf;

/// Fraction of a feature's own area above which overlap with official
/// public parking removes it from the dataset.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.75;

/// Square meters per parking space, used to estimate missing capacity.
/// Sourced from the Raumpilot planning reference.
pub const DEFAULT_AREA_PER_SPACE: f64 = 25.0;

pub const DEFAULT_USER_AGENT: &str = "parkatlas/0.1.0";

pub const DEFAULT_OSM_PARKING: &str = "final_OSM_EXPORT.geojson";
pub const DEFAULT_OFFICIAL_PARKING: &str = "all_parking.gpkg";
pub const DEFAULT_CITY_BOUNDARY: &str = "HH_WFS_Verwaltungsgrenzen.gml";
pub const DEFAULT_GPKG_OUTPUT: &str = "result.gpkg";
pub const DEFAULT_XLSX_OUTPUT: &str = "result.xlsx";

/// Fully resolved pipeline parameters. Everything the run needs is in here;
/// nothing is read from hard-coded literals inside the stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub osm_parking: PathBuf,
    pub official_parking: PathBuf,
    pub city_boundary: PathBuf,
    pub gpkg_output: PathBuf,
    pub xlsx_output: PathBuf,
    pub overlap_threshold: f64,
    pub area_per_space: f64,
    pub user_agent: String,
    pub skip_geocoding: bool,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            osm_parking: PathBuf::from(DEFAULT_OSM_PARKING),
            official_parking: PathBuf::from(DEFAULT_OFFICIAL_PARKING),
            city_boundary: PathBuf::from(DEFAULT_CITY_BOUNDARY),
            gpkg_output: PathBuf::from(DEFAULT_GPKG_OUTPUT),
            xlsx_output: PathBuf::from(DEFAULT_XLSX_OUTPUT),
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            area_per_space: DEFAULT_AREA_PER_SPACE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            skip_geocoding: false,
            verbose: false,
        }
    }
}

/// Optional TOML configuration file. Every field mirrors a CLI flag; flags
/// given on the command line take precedence.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub osm_parking: Option<PathBuf>,
    #[serde(default)]
    pub official_parking: Option<PathBuf>,
    #[serde(default)]
    pub city_boundary: Option<PathBuf>,
    #[serde(default)]
    pub gpkg_output: Option<PathBuf>,
    #[serde(default)]
    pub xlsx_output: Option<PathBuf>,
    #[serde(default)]
    pub overlap_threshold: Option<f64>,
    #[serde(default)]
    pub area_per_space: Option<f64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub skip_geocoding: Option<bool>,
    #[serde(default)]
    pub verbose: Option<bool>,
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("parkatlas.toml"));
    paths.push(PathBuf::from(".parkatlas.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("parkatlas").join("config.toml"));
        paths.push(config_dir.join("parkatlas.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".parkatlas.toml"));
        paths.push(home.join(".config").join("parkatlas").join("config.toml"));
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses_partial_toml() {
        let toml = r#"
            osm_parking = "custom_export.geojson"
            overlap_threshold = 0.5
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.osm_parking,
            Some(PathBuf::from("custom_export.geojson"))
        );
        assert_eq!(config.overlap_threshold, Some(0.5));
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn defaults_match_source_file_set() {
        let config = PipelineConfig::default();
        assert_eq!(config.osm_parking, PathBuf::from("final_OSM_EXPORT.geojson"));
        assert_eq!(config.overlap_threshold, 0.75);
        assert_eq!(config.area_per_space, 25.0);
        assert!(!config.skip_geocoding);
    }
}
