//! Geographic positions and distance math

/// Meters per nautical mile (1/60 of a degree of latitude)
pub const METERS_PER_NM: f64 = 1852.0;

/// Mean earth radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position on the earth's surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPosition {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Altitude in meters
    pub alt_m: f64,
}

impl GeoPosition {
    /// Create a position at the given latitude/longitude and altitude
    pub fn new(lat: f64, lon: f64, alt_m: f64) -> Self {
        Self { lat, lon, alt_m }
    }

    /// Create a position at sea level
    pub fn at(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, 0.0)
    }

    /// Both coordinates are finite numbers
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Great-circle distance in meters (haversine, altitude ignored)
    pub fn distance_m(&self, other: &GeoPosition) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Great-circle distance in nautical miles
    pub fn distance_nm(&self, other: &GeoPosition) -> f64 {
        self.distance_m(other) / METERS_PER_NM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_latitude_is_sixty_nm() {
        let a = GeoPosition::at(0.0, 0.0);
        let b = GeoPosition::at(1.0, 0.0);
        let nm = a.distance_nm(&b);
        assert!((nm - 60.0).abs() < 0.1, "got {nm}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ksfo = GeoPosition::at(37.6188, -122.3750);
        let koak = GeoPosition::at(37.7213, -122.2208);
        let d1 = ksfo.distance_nm(&koak);
        let d2 = koak.distance_nm(&ksfo);
        assert!((d1 - d2).abs() < 1e-9);
        // SFO to OAK is roughly 9.4 nm
        assert!(d1 > 8.5 && d1 < 10.5, "got {d1}");
    }

    #[test]
    fn test_zero_distance() {
        let p = GeoPosition::new(51.47, -0.4543, 25.0);
        assert_eq!(p.distance_m(&p), 0.0);
    }

    #[test]
    fn test_invalid_position() {
        assert!(!GeoPosition::at(f64::NAN, 0.0).is_valid());
        assert!(GeoPosition::at(10.0, 20.0).is_valid());
    }
}
