//! Great-circle distance between WGS84 points.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Deserialization goes through [`Coordinates::new`], so a stored point is
/// always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = String;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
            .ok_or_else(|| format!("coordinates out of range: lat {} lng {}", raw.lat, raw.lng))
    }
}

impl Coordinates {
    /// Builds a point, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// Haversine distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(*self, *other)
    }
}

pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    #[test]
    fn test_zero_distance() {
        let p = point(12.9716, 77.5946);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_known_city_distance() {
        // Bengaluru to Chennai is roughly 290 km as the crow flies.
        let blr = point(12.9716, 77.5946);
        let maa = point(13.0827, 80.2707);
        let d = blr.distance_km(&maa);
        assert!((d - 290.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(point(0.0, 0.0), point(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(28.6139, 77.2090);
        let b = point(19.0760, 72.8777);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = haversine_km(point(0.0, 0.0), point(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_deserialize_validates_range() {
        let ok: Coordinates = serde_json::from_str(r#"{"lat": 12.5, "lng": 77.25}"#).unwrap();
        assert_eq!(ok, point(12.5, 77.25));

        let err = serde_json::from_str::<Coordinates>(r#"{"lat": 167.0284, "lng": 257.5946}"#)
            .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_none());
        assert!(Coordinates::new(90.5, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(-90.0, 180.0).is_some());
    }
}
