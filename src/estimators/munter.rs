//! Munter method

use super::TimeEstimator;
use crate::profile::{HikerProfile, PackWeight};
use crate::types::{EstimationMethod, RouteStats};

/// Ascent counted as extra flat distance; descent costs extra under a heavy pack
pub struct MunterEstimator;

impl TimeEstimator for MunterEstimator {
    fn method(&self) -> EstimationMethod {
        EstimationMethod::Munter
    }

    fn moving_hours(&self, stats: &RouteStats, profile: &HikerProfile) -> f64 {
        let vert_units = stats.elevation_gain_m / 100.0;
        let mut hours = (stats.total_distance_km + vert_units) / profile.combined_speed_kmh();
        if profile.pack_weight == PackWeight::Heavy {
            hours += stats.elevation_loss_m / 1000.0;
        }
        hours
    }
}
