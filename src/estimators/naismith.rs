//! Naismith's rule

use super::TimeEstimator;
use crate::profile::HikerProfile;
use crate::types::{EstimationMethod, RouteStats};

/// Flat time at profile speed plus ascent at a fixed climb rate
pub struct NaismithEstimator;

impl TimeEstimator for NaismithEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Naismith
    }

    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64 {
        let horizontal = stats.total_distance_km / profile.combined_speed_kmh();
        let vertical = stats.elevation_gain_m / profile.fitness.climb_rate_m_per_h();
        horizontal + vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::{stats, track};
    use crate::profile::{Fitness, PackWeight, Pace};

    #[test]
    fn test_flat_ten_km_average_hiker() {
        let stats = track(&[250.0; 11], 1.0);
        let estimate = NaismithEstimator.estimate(&stats, &HikerProfile::default());
        assert_eq!(estimate.method, EstimationMethod::Naismith);
        assert_eq!(estimate.time_minutes, 150);
    }

    #[test]
    fn test_ascent_uses_fitness_climb_rate() {
        let route = stats(12.0, 1200.0, 1200.0);
        let average = HikerProfile::default();
        // 12 / 4 = 3 h + 1200 / 600 = 2 h
        assert_eq!(NaismithEstimator.estimate(&route, &average).time_minutes, 300);

        let elite = HikerProfile::new(Fitness::Elite, Pace::Steady, PackWeight::Light, false);
        // 12 / 7 h + 1200 / 800 h
        let expected = ((12.0 / 7.0 + 1.5) * 60.0_f64).round() as u32;
        assert_eq!(NaismithEstimator.estimate(&route, &elite).time_minutes, expected);
    }

    #[test]
    fn test_breaks_added() {
        let route = stats(12.0, 1200.0, 0.0);
        let profile = HikerProfile {
            include_breaks: true,
            ..Default::default()
        };
        // 300 min moving, five completed hours
        assert_eq!(NaismithEstimator.estimate(&route, &profile).time_minutes, 350);
    }
}
