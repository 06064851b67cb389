//! Energy and hydration estimates
//!
//! Calories use a MET model scaled by route grade and carried weight; water
//! need is a per-hour rate raised by heat, pace and grade.

use crate::profile::{HikerProfile, Pace};
use crate::types::{BioMetrics, RouteStats};

/// Assumed body mass without pack (kg)
pub const BODY_WEIGHT_KG: f64 = 75.0;

/// Baseline water intake (L/h)
const BASE_WATER_RATE_L_PER_H: f64 = 0.5;

/// Average grade of the whole route: ascent over distance (percent)
pub fn average_grade_pct(stats: &RouteStats) -> f64 {
    let distance_m = stats.total_distance_km * 1000.0;
    if distance_m > 0.0 {
        stats.elevation_gain_m / distance_m * 100.0
    } else {
        0.0
    }
}

/// Metabolic equivalent for the pace, raised by grade
pub fn met(pace: Pace, avg_grade_pct: f64) -> f64 {
    let base = if pace.is_running() {
        8.0
    } else if pace.is_fast() {
        5.0
    } else {
        3.5
    };
    base + avg_grade_pct * 0.3
}

/// Water intake rate (L/h); temperature bands stack
pub fn water_rate_l_per_h(pace: Pace, avg_grade_pct: f64, max_temp_c: Option<f64>) -> f64 {
    let mut rate = BASE_WATER_RATE_L_PER_H;

    if let Some(temp) = max_temp_c {
        if temp > 20.0 {
            rate += 0.2;
        }
        if temp > 28.0 {
            rate += 0.3;
        }
        if temp > 35.0 {
            rate += 0.2;
        }
    }
    if pace.is_fast() || pace.is_running() {
        rate += 0.2;
    }
    if avg_grade_pct > 8.0 {
        rate += 0.1;
    }

    rate
}

/// Calories and water for a hike of `duration_minutes`
pub fn estimate(
    stats: &RouteStats,
    profile: &HikerProfile,
    duration_minutes: f64,
    max_temp_c: Option<f64>,
) -> BioMetrics {
    let hours = (duration_minutes / 60.0).max(0.0);
    let grade = average_grade_pct(stats);

    let total_weight = BODY_WEIGHT_KG + profile.pack_weight.load_kg();
    let calories = (met(profile.pace, grade) * total_weight * hours).round();

    let water = water_rate_l_per_h(profile.pace, grade, max_temp_c) * hours;

    BioMetrics {
        calories: calories as u32,
        water_liters: (water * 10.0).round() / 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::stats;
    use crate::profile::{Fitness, PackWeight};

    #[test]
    fn test_flat_steady_walk() {
        let route = stats(10.0, 0.0, 0.0);
        let bio = estimate(&route, &HikerProfile::default(), 150.0, None);
        // 3.5 MET * 75 kg * 2.5 h
        assert_eq!(bio.calories, 656);
        // 0.5 L/h * 2.5 h
        assert_eq!(bio.water_liters, 1.3);
    }

    #[test]
    fn test_grade_and_pack_raise_calories() {
        let route = stats(10.0, 1000.0, 1000.0);
        assert!((average_grade_pct(&route) - 10.0).abs() < 1e-12);

        let heavy = HikerProfile::new(Fitness::Average, Pace::Steady, PackWeight::Heavy, false);
        let bio = estimate(&route, &heavy, 240.0, None);
        // (3.5 + 3.0) MET * 90 kg * 4 h
        assert_eq!(bio.calories, 2340);
    }

    #[test]
    fn test_met_by_pace() {
        assert_eq!(met(Pace::Steady, 0.0), 3.5);
        assert_eq!(met(Pace::PowerHike, 0.0), 5.0);
        assert_eq!(met(Pace::Race, 0.0), 8.0);
    }

    #[test]
    fn test_water_temperature_bands_accumulate() {
        assert_eq!(water_rate_l_per_h(Pace::Steady, 0.0, Some(15.0)), 0.5);
        assert!((water_rate_l_per_h(Pace::Steady, 0.0, Some(25.0)) - 0.7).abs() < 1e-12);
        assert!((water_rate_l_per_h(Pace::Steady, 0.0, Some(30.0)) - 1.0).abs() < 1e-12);
        assert!((water_rate_l_per_h(Pace::Steady, 0.0, Some(38.0)) - 1.2).abs() < 1e-12);
        // fast pace and steep route
        assert!((water_rate_l_per_h(Pace::Fast, 9.0, Some(38.0)) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_distance_route() {
        let route = stats(0.0, 0.0, 0.0);
        assert_eq!(average_grade_pct(&route), 0.0);
        let bio = estimate(&route, &HikerProfile::default(), 0.0, Some(30.0));
        assert_eq!(bio.calories, 0);
        assert_eq!(bio.water_liters, 0.0);
    }
}
