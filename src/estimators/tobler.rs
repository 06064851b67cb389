//! Tobler's hiking function
//!
//! Integrates walking speed segment by segment over the raw analyzed points
//! (not the smoothed display series). The function describes a 6 km/h
//! reference walker, so the integrated time is rescaled to the profile speed.

use super::TimeEstimator;
use crate::geo;
use crate::profile::HikerProfile;
use crate::types::{EstimationMethod, RouteStats};

/// Flat-ground speed of Tobler's reference walker (km/h)
pub const TOBLER_REFERENCE_SPEED_KMH: f64 = 6.0;

/// Lowest speed the function may return (km/h)
pub const TOBLER_VELOCITY_FLOOR_KMH: f64 = 0.5;

/// Walking speed for a gradient expressed as rise/run (not percent)
pub fn tobler_velocity_kmh(gradient: f64) -> f64 {
    let v = TOBLER_REFERENCE_SPEED_KMH * (-3.5 * (gradient + 0.05).abs()).exp();
    if v.is_finite() {
        v.max(TOBLER_VELOCITY_FLOOR_KMH)
    } else {
        TOBLER_VELOCITY_FLOOR_KMH
    }
}

/// Reference-walker time (hours) for one segment; zero-length segments take no time
pub fn tobler_segment_hours(distance_km: f64, ele_delta_m: f64) -> f64 {
    if distance_km <= 0.0 {
        return 0.0;
    }
    let gradient = ele_delta_m / (distance_km * 1000.0);
    distance_km / tobler_velocity_kmh(gradient)
}

/// Per-segment integration of Tobler's function
pub struct ToblerEstimator;

impl TimeEstimator for ToblerEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Tobler
    }

    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64 {
        let reference_hours: f64 = stats
            .points
            .windows(2)
            .map(|w| {
                let seg_km = geo::segment_km(&w[0].track_point(), &w[1].track_point());
                tobler_segment_hours(seg_km, w[1].ele - w[0].ele)
            })
            .sum();

        reference_hours * (TOBLER_REFERENCE_SPEED_KMH / profile.combined_speed_kmh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::track;

    #[test]
    fn test_peak_speed_on_slight_downhill() {
        let peak = tobler_velocity_kmh(-0.05);
        assert!((peak - 6.0).abs() < 1e-12);
        assert!(tobler_velocity_kmh(0.0) < peak);
        assert!(tobler_velocity_kmh(-0.10) < peak);
        // Flat ground is about 5.04 km/h
        assert!((tobler_velocity_kmh(0.0) - 5.0368).abs() < 1e-3);
    }

    #[test]
    fn test_velocity_floor_on_extreme_grade() {
        // 1 km at 200% grade would be ~0.005 km/h unclamped
        assert_eq!(tobler_velocity_kmh(2.0), TOBLER_VELOCITY_FLOOR_KMH);
        let hours = tobler_segment_hours(1.0, 2000.0);
        assert!(hours.is_finite() && hours > 0.0);
        assert!((hours - 1.0 / TOBLER_VELOCITY_FLOOR_KMH).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_segment_takes_no_time() {
        assert_eq!(tobler_segment_hours(0.0, 50.0), 0.0);
    }

    #[test]
    fn test_flat_track_rescaled_to_profile() {
        // 10 km flat: 10 / 5.0368 h at reference, times 6 / 4
        let stats = track(&[100.0; 11], 1.0);
        let hours = ToblerEstimator.moving_hours(&stats, &HikerProfile::default());
        let expected = 10.0 / tobler_velocity_kmh(0.0) * 1.5;
        assert!((hours - expected).abs() < 1e-6);
    }

    #[test]
    fn test_single_point_track_is_zero() {
        let stats = track(&[100.0], 1.0);
        let estimate = ToblerEstimator.estimate(&stats, &HikerProfile::default());
        assert_eq!(estimate.time_minutes, 0);
    }
}
