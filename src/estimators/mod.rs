//! Time estimators
//!
//! Five independent algorithms turn route statistics and a hiker profile into
//! a duration. Each is a pure function of its inputs, so they can run in any
//! order (or in parallel) with identical results.

mod munter;
mod naismith;
mod petzoldt;
mod swiss;
mod tobler;

pub use munter::MunterEstimator;
pub use naismith::NaismithEstimator;
pub use petzoldt::PetzoldtEstimator;
pub use swiss::SwissEstimator;
pub use tobler::{tobler_segment_hours, tobler_velocity_kmh, ToblerEstimator, TOBLER_VELOCITY_FLOOR_KMH};

use crate::profile::HikerProfile;
use crate::types::{EstimationMethod, RouteStats, TimeEstimation};

/// Trait for time-estimation algorithms
pub trait TimeEstimator {
    /// Which algorithm this is
    fn method(&self) -> EstimationMethod;

    /// Moving time in hours, before breaks
    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64;

    /// Full estimate with breaks applied
    fn estimate(&self, stats: &RouteStats, profile: &HikerProfile) -> TimeEstimation {
        let method = self.method();
        TimeEstimation {
            method,
            time_minutes: profile.total_minutes(self.moving_hours(stats, profile)),
            description: method.description().to_string(),
        }
    }
}

/// Estimator for a given method
pub fn estimator_for(method: EstimationMethod) -> &'static dyn TimeEstimator {
    match method {
        EstimationMethod::Naismith => &NaismithEstimator,
        EstimationMethod::Tobler => &ToblerEstimator,
        EstimationMethod::Munter => &MunterEstimator,
        EstimationMethod::Swiss => &SwissEstimator,
        EstimationMethod::Petzoldt => &PetzoldtEstimator,
    }
}

/// Run all five estimators in their canonical order
pub fn estimate_all(stats: &RouteStats, profile: &HikerProfile) -> Vec<TimeEstimation> {
    EstimationMethod::ALL
        .iter()
        .map(|m| estimator_for(*m).estimate(stats, profile))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::reducer::TrackReducer;
    use crate::types::{RouteStats, SlopeBreakdown, TrackPoint};

    /// Straight northward track with the given elevations, `step_km` apart
    pub fn track(elevations: &[f64], step_km: f64) -> RouteStats {
        let step_deg = step_km / 111.194_926_644_558_73;
        let points: Vec<TrackPoint> = elevations
            .iter()
            .enumerate()
            .map(|(i, ele)| TrackPoint::new(45.0 + i as f64 * step_deg, 7.0, *ele))
            .collect();
        TrackReducer::reduce(&points).unwrap()
    }

    /// Aggregate-only stats (no points) for the formula-based estimators
    pub fn stats(distance_km: f64, gain_m: f64, loss_m: f64) -> RouteStats {
        RouteStats {
            total_distance_km: distance_km,
            elevation_gain_m: gain_m,
            elevation_loss_m: loss_m,
            max_elevation_m: 0.0,
            min_elevation_m: 0.0,
            avg_slope_pct: 0.0,
            slope_breakdown: SlopeBreakdown::default(),
            points: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::track;
    use super::*;
    use crate::profile::{Fitness, PackWeight, Pace};

    #[test]
    fn test_estimate_all_order_and_identity() {
        let stats = track(&[1000.0, 1100.0, 1050.0, 1200.0], 1.0);
        let estimates = estimate_all(&stats, &HikerProfile::default());
        let methods: Vec<EstimationMethod> = estimates.iter().map(|e| e.method).collect();
        assert_eq!(methods, EstimationMethod::ALL.to_vec());
        assert!(estimates.iter().all(|e| e.time_minutes > 0));
    }

    #[test]
    fn test_estimates_are_deterministic() {
        let stats = track(&[300.0, 420.0, 380.0, 610.0, 500.0], 0.8);
        let profile = HikerProfile::new(Fitness::Active, Pace::Brisk, PackWeight::Medium, true);
        assert_eq!(estimate_all(&stats, &profile), estimate_all(&stats, &profile));
    }

    #[test]
    fn test_faster_profile_never_takes_longer() {
        let stats = track(&[500.0, 700.0, 650.0, 900.0, 800.0], 2.0);
        let slow = HikerProfile::new(Fitness::Beginner, Pace::Relaxed, PackWeight::Heavy, false);
        let fast = HikerProfile::new(Fitness::Athletic, Pace::Fast, PackWeight::Light, false);
        for (s, f) in estimate_all(&stats, &slow)
            .iter()
            .zip(estimate_all(&stats, &fast).iter())
        {
            assert!(f.time_minutes <= s.time_minutes, "{:?}", s.method);
        }
    }
}
