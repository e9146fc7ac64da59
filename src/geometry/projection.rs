use geo::{Coord, Geometry, MapCoords};

/// Transverse Mercator projection between EPSG:4326 (lat/lon degrees) and
/// EPSG:25832 (ETRS89 / UTM zone 32N, meters).
///
/// Uses the Krüger flattening series (third order in n) on the GRS80
/// ellipsoid. This avoids the complexity of the proj crate while staying
/// well below 1 mm of error anywhere inside the zone, which is far more
/// precision than the parking datasets carry.
#[derive(Debug, Clone)]
pub struct Utm32Projector {
    // Rectifying radius k0 * A
    radius: f64,
    n: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

// GRS80 ellipsoid (ETRS89)
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_222_101;

const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
/// Central meridian of UTM zone 32N.
const CENTRAL_MERIDIAN_DEG: f64 = 9.0;

impl Default for Utm32Projector {
    fn default() -> Self {
        Self::new()
    }
}

impl Utm32Projector {
    pub fn new() -> Self {
        let n = FLATTENING / (2.0 - FLATTENING);
        let n2 = n * n;
        let n3 = n2 * n;

        let rectifying = SEMI_MAJOR_AXIS / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);

        Self {
            radius: SCALE_FACTOR * rectifying,
            n,
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    /// Project a geographic coordinate to UTM 32N.
    ///
    /// # Returns
    /// * (easting, northing) in meters
    pub fn project(&self, lat: f64, lon: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let lambda = (lon - CENTRAL_MERIDIAN_DEG).to_radians();

        let e = 2.0 * self.n.sqrt() / (1.0 + self.n);
        let t = (phi.sin().atanh() - e * (e * phi.sin()).atanh()).sinh();

        let xi_prime = (t / lambda.cos()).atan();
        let eta_prime = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        (FALSE_EASTING + self.radius * eta, self.radius * xi)
    }

    /// Inverse projection from UTM 32N back to geographic coordinates.
    ///
    /// # Returns
    /// * (lat, lon) in degrees
    pub fn unproject(&self, easting: f64, northing: f64) -> (f64, f64) {
        let xi = northing / self.radius;
        let eta = (easting - FALSE_EASTING) / self.radius;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
        let mut phi = chi;
        for (j, d) in self.delta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            phi += d * (k * chi).sin();
        }
        let lambda = eta_prime.sinh().atan2(xi_prime.cos());

        (phi.to_degrees(), CENTRAL_MERIDIAN_DEG + lambda.to_degrees())
    }

    /// Reproject a whole geometry from EPSG:4326 to EPSG:25832.
    ///
    /// Geographic geometries store coordinates as x=lon, y=lat.
    pub fn geometry_to_metric(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|c: Coord<f64>| {
            let (easting, northing) = self.project(c.y, c.x);
            Coord {
                x: easting,
                y: northing,
            }
        })
    }

    /// Reproject a whole geometry from EPSG:25832 to EPSG:4326.
    pub fn geometry_to_geographic(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|c: Coord<f64>| {
            let (lat, lon) = self.unproject(c.x, c.y);
            Coord { x: lon, y: lat }
        })
    }
}
