//! Great-circle distance primitives
//!
//! Every distance in the engine goes through [`distance_km`]. Coordinates are
//! WGS84 degrees; no range validation happens here.

use crate::types::TrackPoint;

/// Mean Earth radius used by the haversine formula (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometres.
///
/// Returns 0 for identical points.
pub fn distance_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let d_lat = (lat_b - lat_a).to_radians();
    let d_lon = (lon_b - lon_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards asin against a > 1 from rounding on antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Distance between two track points, in kilometres
pub fn segment_km(from: &TrackPoint, to: &TrackPoint) -> f64 {
    distance_km(from.lat, from.lon, to.lat, to.lon)
}
