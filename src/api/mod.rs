pub mod nominatim;

pub use nominatim::{GeocodeError, NominatimAddress, ReverseGeocoder};
