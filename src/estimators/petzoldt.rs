//! Petzoldt energy miles

use super::TimeEstimator;
use crate::profile::HikerProfile;
use crate::types::{EstimationMethod, RouteStats};

/// Metres of ascent worth one flat-equivalent kilometre (500 ft)
pub const ENERGY_MILE_ASCENT_M: f64 = 152.4;

/// Ascent converted into extra flat distance
pub struct PetzoldtEstimator;

impl TimeEstimator for PetzoldtEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Petzoldt
    }

    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64 {
        let equivalent_km = stats.total_distance_km + stats.elevation_gain_m / ENERGY_MILE_ASCENT_M;
        equivalent_km / profile.combined_speed_kmh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::stats;

    #[test]
    fn test_energy_miles() {
        // 10 + 762 / 152.4 = 15 km at 4 km/h
        let route = stats(10.0, 762.0, 0.0);
        assert_eq!(
            PetzoldtEstimator.estimate(&route, &HikerProfile::default()).time_minutes,
            225
        );
    }

    #[test]
    fn test_descent_is_free() {
        let up = stats(10.0, 300.0, 0.0);
        let updown = stats(10.0, 300.0, 900.0);
        let profile = HikerProfile::default();
        assert_eq!(
            PetzoldtEstimator.estimate(&up, &profile),
            PetzoldtEstimator.estimate(&updown, &profile)
        );
    }
}
