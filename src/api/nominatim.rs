use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Address components returned by the Nominatim reverse endpoint.
///
/// Only the fields the exports consume are deserialized; everything else in
/// the `address` object is ignored. All fields are optional because
/// Nominatim omits whatever it cannot determine for a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NominatimAddress {
    pub postcode: Option<String>,
    pub road: Option<String>,
    pub house_number: Option<String>,
    pub city_district: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub amenity: Option<String>,
}

impl NominatimAddress {
    /// Road and house number concatenated, e.g. "Jungfernstieg 7".
    /// Empty string when the road is unknown.
    pub fn street_address(&self) -> String {
        match (&self.road, &self.house_number) {
            (Some(road), Some(number)) => format!("{} {}", road, number),
            (Some(road), None) => road.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<NominatimAddress>,
    /// Nominatim reports "Unable to geocode" here instead of an HTTP error.
    error: Option<String>,
}

/// Failure of a single reverse-geocode attempt.
///
/// The pipeline treats every variant the same way (feature keeps empty
/// address fields, run continues), but the typed error makes the per-feature
/// outcome reportable instead of a console print.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("no address known for ({lat:.6}, {lon:.6})")]
    NoAddress { lat: f64, lon: f64 },
    #[error("service error: {0}")]
    Service(String),
}

/// Blocking client for the Nominatim reverse-geocoding endpoint.
///
/// One request per feature, strictly sequential. Nominatim requires an
/// identifying user agent, so construction fails without one.
pub struct ReverseGeocoder {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_base_url(user_agent, NOMINATIM_REVERSE_URL)
    }

    pub fn with_base_url(user_agent: &str, base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Reverse-geocode a single geographic coordinate.
    pub fn reverse(&self, lat: f64, lon: f64) -> Result<NominatimAddress, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", format!("{}", lat)),
                ("lon", format!("{}", lon)),
                ("format", "jsonv2".to_string()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let parsed: ReverseResponse = response.json()?;
        if let Some(message) = parsed.error {
            return Err(GeocodeError::Service(message));
        }
        parsed
            .address
            .ok_or(GeocodeError::NoAddress { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reverse_response() {
        let json = r#"{
            "display_name": "7, Jungfernstieg, Neustadt, Hamburg-Mitte, Hamburg, 20354, Deutschland",
            "address": {
                "house_number": "7",
                "road": "Jungfernstieg",
                "suburb": "Neustadt",
                "city_district": "Hamburg-Mitte",
                "city": "Hamburg",
                "postcode": "20354",
                "country": "Deutschland"
            }
        }"#;
        let parsed: ReverseResponse = serde_json::from_str(json).unwrap();
        let address = parsed.address.unwrap();
        assert_eq!(address.postcode.as_deref(), Some("20354"));
        assert_eq!(address.street_address(), "Jungfernstieg 7");
        assert_eq!(address.city_district.as_deref(), Some("Hamburg-Mitte"));
        assert_eq!(address.amenity, None);
    }

    #[test]
    fn parses_unable_to_geocode() {
        let json = r#"{"error": "Unable to geocode"}"#;
        let parsed: ReverseResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("Unable to geocode"));
        assert!(parsed.address.is_none());
    }

    #[test]
    fn street_address_without_house_number() {
        let address = NominatimAddress {
            road: Some("Jungfernstieg".to_string()),
            ..Default::default()
        };
        assert_eq!(address.street_address(), "Jungfernstieg");
        assert_eq!(NominatimAddress::default().street_address(), "");
    }
}
