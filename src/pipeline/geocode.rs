use geo::Centroid;

use crate::api::{GeocodeError, NominatimAddress};
use crate::domain::ParkingFeature;

/// Aggregated outcome of the reverse-geocoding stage.
///
/// Individual failures never abort the run; the feature keeps empty address
/// fields and the failure is recorded here for the end-of-run report.
#[derive(Debug, Default)]
pub struct GeocodeSummary {
    pub resolved: usize,
    pub failed: usize,
    pub failures: Vec<(usize, String)>,
}

/// Reverse-geocode every feature's centroid, strictly one request at a time.
///
/// The lookup is injected so the stage can be exercised without the network;
/// the caller passes `(lat, lon)` of the centroid in geographic coordinates.
pub fn geocode_features<F>(features: &mut [ParkingFeature], mut reverse: F) -> GeocodeSummary
where
    F: FnMut(f64, f64) -> Result<NominatimAddress, GeocodeError>,
{
    let mut summary = GeocodeSummary::default();

    for (index, feature) in features.iter_mut().enumerate() {
        let Some(centroid) = feature.geometry.centroid() else {
            summary.failed += 1;
            summary
                .failures
                .push((index, "geometry has no centroid".to_string()));
            continue;
        };

        match reverse(centroid.y(), centroid.x()) {
            Ok(address) => {
                feature.address = address;
                summary.resolved += 1;
            }
            Err(error) => {
                summary.failed += 1;
                summary.failures.push((index, error.to_string()));
            }
        }
    }

    summary
}
