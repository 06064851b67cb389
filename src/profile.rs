//! Hiker profile and the shared speed model
//!
//! Four of the five estimators share one notion of speed: a flat-ground base
//! speed per fitness tier, scaled by a pace multiplier and a pack-weight
//! correction. Rest breaks are added on top of moving time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// Fitness tier, slowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Fitness {
    Sedentary,
    Casual,
    Beginner,
    Average,
    Active,
    Athletic,
    Elite,
}

impl Fitness {
    pub const ALL: [Fitness; 7] = [
        Fitness::Sedentary,
        Fitness::Casual,
        Fitness::Beginner,
        Fitness::Average,
        Fitness::Active,
        Fitness::Athletic,
        Fitness::Elite,
    ];

    /// Flat-ground walking speed (km/h)
    pub fn base_speed_kmh(&self) -> f64 {
        match self {
            Fitness::Sedentary => 2.5,
            Fitness::Casual => 3.0,
            Fitness::Beginner => 3.5,
            Fitness::Average => 4.0,
            Fitness::Active => 5.0,
            Fitness::Athletic => 6.0,
            Fitness::Elite => 7.0,
        }
    }

    /// Metres of ascent climbed per hour in Naismith's rule
    pub fn climb_rate_m_per_h(&self) -> f64 {
        match self {
            Fitness::Athletic | Fitness::Elite => 800.0,
            _ => 600.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fitness::Sedentary => "sedentary",
            Fitness::Casual => "casual",
            Fitness::Beginner => "beginner",
            Fitness::Average => "average",
            Fitness::Active => "active",
            Fitness::Athletic => "athletic",
            Fitness::Elite => "elite",
        }
    }
}

/// Hiking or running style, slowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Pace {
    Leisurely,
    Relaxed,
    Steady,
    Brisk,
    Fast,
    PowerHike,
    TrailRun,
    Race,
}

impl Pace {
    pub const ALL: [Pace; 8] = [
        Pace::Leisurely,
        Pace::Relaxed,
        Pace::Steady,
        Pace::Brisk,
        Pace::Fast,
        Pace::PowerHike,
        Pace::TrailRun,
        Pace::Race,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            Pace::Leisurely => 0.6,
            Pace::Relaxed => 0.8,
            Pace::Steady => 1.0,
            Pace::Brisk => 1.2,
            Pace::Fast => 1.4,
            Pace::PowerHike => 1.6,
            Pace::TrailRun => 2.0,
            Pace::Race => 2.4,
        }
    }

    /// Running styles never take scheduled breaks
    pub fn is_running(&self) -> bool {
        matches!(self, Pace::TrailRun | Pace::Race)
    }

    /// Fast hiking styles (not running)
    pub fn is_fast(&self) -> bool {
        matches!(self, Pace::Fast | Pace::PowerHike)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Leisurely => "leisurely",
            Pace::Relaxed => "relaxed",
            Pace::Steady => "steady",
            Pace::Brisk => "brisk",
            Pace::Fast => "fast",
            Pace::PowerHike => "power_hike",
            Pace::TrailRun => "trail_run",
            Pace::Race => "race",
        }
    }
}

/// Carried load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum PackWeight {
    Light,
    Medium,
    Heavy,
}

impl PackWeight {
    pub const ALL: [PackWeight; 3] = [PackWeight::Light, PackWeight::Medium, PackWeight::Heavy];

    /// Speed correction factor
    pub fn speed_factor(&self) -> f64 {
        match self {
            PackWeight::Light => 1.0,
            PackWeight::Medium => 0.95,
            PackWeight::Heavy => 0.85,
        }
    }

    /// Pack mass added to body weight (kg)
    pub fn load_kg(&self) -> f64 {
        match self {
            PackWeight::Light => 0.0,
            PackWeight::Medium => 7.0,
            PackWeight::Heavy => 15.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackWeight::Light => "light",
            PackWeight::Medium => "medium",
            PackWeight::Heavy => "heavy",
        }
    }
}

macro_rules! impl_profile_str {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ComputeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ComputeError::InvalidProfile(format!("unknown {} '{}'", $what, s)))
            }
        }
    };
}

impl_profile_str!(Fitness, "fitness");
impl_profile_str!(Pace, "pace");
impl_profile_str!(PackWeight, "pack weight");

/// User-supplied hiker profile, fixed for one calculation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HikerProfile {
    pub fitness: Fitness,
    pub pace: Pace,
    pub pack_weight: PackWeight,
    pub include_breaks: bool,
}

impl Default for HikerProfile {
    fn default() -> Self {
        Self {
            fitness: Fitness::Average,
            pace: Pace::Steady,
            pack_weight: PackWeight::Light,
            include_breaks: false,
        }
    }
}

impl HikerProfile {
    pub fn new(fitness: Fitness, pace: Pace, pack_weight: PackWeight, include_breaks: bool) -> Self {
        Self {
            fitness,
            pace,
            pack_weight,
            include_breaks,
        }
    }

    /// Base speed x pace multiplier x pack correction (km/h)
    pub fn combined_speed_kmh(&self) -> f64 {
        self.fitness.base_speed_kmh() * self.pace.multiplier() * self.pack_weight.speed_factor()
    }

    /// Rest time for a given moving time: 10 minutes per completed hour
    pub fn break_minutes(&self, moving_minutes: f64) -> f64 {
        if !self.include_breaks || self.pace.is_running() {
            return 0.0;
        }
        (moving_minutes / 60.0).floor().max(0.0) * 10.0
    }

    /// Moving time plus breaks, as whole minutes
    pub fn total_minutes(&self, moving_hours: f64) -> u32 {
        let moving_minutes = moving_hours * 60.0;
        let total = moving_minutes + self.break_minutes(moving_minutes);
        if total.is_finite() && total > 0.0 {
            total.round() as u32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_steady_light_is_four_kmh() {
        let profile = HikerProfile::default();
        assert!((profile.combined_speed_kmh() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_tables_are_ordered() {
        for pair in Fitness::ALL.windows(2) {
            assert!(pair[0].base_speed_kmh() < pair[1].base_speed_kmh());
        }
        for pair in Pace::ALL.windows(2) {
            assert!(pair[0].multiplier() < pair[1].multiplier());
        }
        assert_eq!(Fitness::Sedentary.base_speed_kmh(), 2.5);
        assert_eq!(Fitness::Elite.base_speed_kmh(), 7.0);
        assert_eq!(Pace::Leisurely.multiplier(), 0.6);
        assert_eq!(Pace::Race.multiplier(), 2.4);
    }

    #[test]
    fn test_heavy_pack_slows_down() {
        let light = HikerProfile::default();
        let heavy = HikerProfile {
            pack_weight: PackWeight::Heavy,
            ..light
        };
        assert!((heavy.combined_speed_kmh() - 3.4).abs() < 1e-12);
    }

    #[test]
    fn test_breaks_per_completed_hour() {
        let profile = HikerProfile {
            include_breaks: true,
            ..Default::default()
        };
        assert_eq!(profile.break_minutes(59.0), 0.0);
        assert_eq!(profile.break_minutes(60.0), 10.0);
        assert_eq!(profile.break_minutes(179.0), 20.0);
        assert_eq!(profile.total_minutes(2.5), 170);
    }

    #[test]
    fn test_no_breaks_when_running_or_disabled() {
        let running = HikerProfile {
            pace: Pace::TrailRun,
            include_breaks: true,
            ..Default::default()
        };
        assert_eq!(running.break_minutes(300.0), 0.0);
        assert_eq!(HikerProfile::default().break_minutes(300.0), 0.0);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("Elite".parse::<Fitness>().unwrap(), Fitness::Elite);
        assert_eq!("power-hike".parse::<Pace>().unwrap(), Pace::PowerHike);
        assert_eq!("heavy".parse::<PackWeight>().unwrap(), PackWeight::Heavy);
        assert!(matches!(
            "sprint".parse::<Pace>(),
            Err(ComputeError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let profile: HikerProfile =
            serde_json::from_str(r#"{"fitness": "athletic", "include_breaks": true}"#).unwrap();
        assert_eq!(profile.fitness, Fitness::Athletic);
        assert_eq!(profile.pace, Pace::Steady);
        assert!(profile.include_breaks);
        assert_eq!(profile.fitness.climb_rate_m_per_h(), 800.0);
    }
}
