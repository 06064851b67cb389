//! Swiss hiking formula (DIN 33466)

use super::TimeEstimator;
use crate::profile::HikerProfile;
use crate::types::{EstimationMethod, RouteStats};

/// Reference walking speed of the DIN baseline hiker (km/h)
const BASELINE_SPEED_KMH: f64 = 4.0;
/// Ascent per hour for the baseline hiker (m)
const ASCENT_M_PER_H: f64 = 400.0;
/// Descent per hour for the baseline hiker (m)
const DESCENT_M_PER_H: f64 = 800.0;

/// The slower axis dominates, the faster one contributes half
pub struct SwissEstimator;

impl TimeEstimator for SwissEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Swiss
    }

    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64 {
        let speed_factor = profile.combined_speed_kmh() / BASELINE_SPEED_KMH;

        let horizontal = stats.total_distance_km / (BASELINE_SPEED_KMH * speed_factor);
        let vertical = stats.elevation_gain_m / (ASCENT_M_PER_H * speed_factor)
            + stats.elevation_loss_m / (DESCENT_M_PER_H * speed_factor);

        horizontal.max(vertical) + 0.5 * horizontal.min(vertical)
    }
}
