//! Difficulty rating
//!
//! Scores a route in effort points (flat km plus one point per 100 m of
//! ascent), maps the score onto eight ordered bands and tags notable terrain.

use crate::reducer::gain_over;
use crate::types::{DifficultyBand, DifficultyRating, RouteStats, SlopeBand};

/// Share of the track (by point index) treated as start or finish
const EDGE_FRACTION: f64 = 0.15;

/// At most this many terrain tags are reported
const MAX_TERRAIN_TAGS: usize = 2;

const DEFAULT_TERRAIN_TAG: &str = "Varied Terrain";

impl DifficultyBand {
    pub const ALL: [DifficultyBand; 8] = [
        DifficultyBand::VeryEasy,
        DifficultyBand::Easy,
        DifficultyBand::Moderate,
        DifficultyBand::Challenging,
        DifficultyBand::Hard,
        DifficultyBand::Demanding,
        DifficultyBand::Strenuous,
        DifficultyBand::Extreme,
    ];

    /// Band for an effort score
    pub fn from_score(score: f64) -> Self {
        DifficultyBand::ALL
            .iter()
            .copied()
            .find(|b| b.upper_bound().is_some_and(|limit| score < limit))
            .unwrap_or(DifficultyBand::Extreme)
    }

    /// Exclusive upper score of the band; `None` for the last band
    pub fn upper_bound(&self) -> Option<f64> {
        match self {
            DifficultyBand::VeryEasy => Some(5.0),
            DifficultyBand::Easy => Some(8.0),
            DifficultyBand::Moderate => Some(12.0),
            DifficultyBand::Challenging => Some(18.0),
            DifficultyBand::Hard => Some(25.0),
            DifficultyBand::Demanding => Some(35.0),
            DifficultyBand::Strenuous => Some(45.0),
            DifficultyBand::Extreme => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyBand::VeryEasy => "Very Easy",
            DifficultyBand::Easy => "Easy",
            DifficultyBand::Moderate => "Moderate",
            DifficultyBand::Challenging => "Challenging",
            DifficultyBand::Hard => "Hard",
            DifficultyBand::Demanding => "Demanding",
            DifficultyBand::Strenuous => "Strenuous",
            DifficultyBand::Extreme => "Extreme",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DifficultyBand::VeryEasy => "A short stroll suitable for everyone.",
            DifficultyBand::Easy => "Gentle outing with little climbing.",
            DifficultyBand::Moderate => "A proper hike; some fitness helps.",
            DifficultyBand::Challenging => "Long or hilly day requiring regular hiking experience.",
            DifficultyBand::Hard => "Sustained effort with significant ascent.",
            DifficultyBand::Demanding => "Full mountain day for fit and experienced hikers.",
            DifficultyBand::Strenuous => "Very long and steep; plan food, water and turnaround times.",
            DifficultyBand::Extreme => "Expedition-grade effort for highly trained athletes.",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DifficultyBand::VeryEasy => "#22c55e",
            DifficultyBand::Easy => "#84cc16",
            DifficultyBand::Moderate => "#eab308",
            DifficultyBand::Challenging => "#f59e0b",
            DifficultyBand::Hard => "#f97316",
            DifficultyBand::Demanding => "#ef4444",
            DifficultyBand::Strenuous => "#dc2626",
            DifficultyBand::Extreme => "#7f1d1d",
        }
    }

    /// 1-based position in the band order
    pub fn level(&self) -> u8 {
        *self as u8 + 1
    }
}

/// Effort points: distance plus one km-equivalent per 100 m of ascent
pub fn effort_points(total_distance_km: f64, elevation_gain_m: f64) -> f64 {
    total_distance_km + elevation_gain_m / 100.0
}

/// Rate the difficulty of a reduced route
pub fn rate(stats: &RouteStats) -> DifficultyRating {
    let score = effort_points(stats.total_distance_km, stats.elevation_gain_m);
    let band = DifficultyBand::from_score(score);

    DifficultyRating {
        score,
        band,
        label: band.label().to_string(),
        description: band.description().to_string(),
        level: band.level(),
        color: band.color().to_string(),
        terrain_tags: terrain_tags(stats).join(", "),
        equivalent_flat_km: score,
    }
}

/// Terrain characteristics, in priority order, capped at two
pub fn terrain_tags(stats: &RouteStats) -> Vec<&'static str> {
    let mut tags = Vec::new();

    if stats.max_elevation_m > 2500.0 {
        tags.push("High Altitude");
    } else if stats.max_elevation_m > 1500.0 {
        tags.push("Alpine");
    }

    let n = stats.points.len();
    if n >= 2 {
        let edge = ((n as f64) * EDGE_FRACTION).floor() as usize;
        let start_gain = gain_over(&stats.points[..=edge.min(n - 1)]);
        if stats.elevation_gain_m > 0.0 && start_gain > 0.25 * stats.elevation_gain_m {
            tags.push("Steep Start");
        }

        let finish_gain = gain_over(&stats.points[n - 1 - edge.min(n - 1)..]);
        if finish_gain > 150.0 {
            tags.push("Uphill Finish");
        }
    }

    let breakdown = &stats.slope_breakdown;
    if breakdown.fraction(SlopeBand::SteepUp) + breakdown.fraction(SlopeBand::SteepDown) > 0.30 {
        tags.push("Technical/Steep");
    }
    if breakdown.fraction(SlopeBand::Flat) > 0.60 {
        tags.push("Mostly Flat");
    }

    if tags.is_empty() {
        tags.push(DEFAULT_TERRAIN_TAG);
    }
    tags.truncate(MAX_TERRAIN_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimators::test_support::track;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(DifficultyBand::from_score(0.0), DifficultyBand::VeryEasy);
        assert_eq!(DifficultyBand::from_score(4.99), DifficultyBand::VeryEasy);
        assert_eq!(DifficultyBand::from_score(5.0), DifficultyBand::Easy);
        assert_eq!(DifficultyBand::from_score(11.9), DifficultyBand::Moderate);
        assert_eq!(DifficultyBand::from_score(17.0), DifficultyBand::Challenging);
        assert_eq!(DifficultyBand::from_score(24.0), DifficultyBand::Hard);
        assert_eq!(DifficultyBand::from_score(34.0), DifficultyBand::Demanding);
        assert_eq!(DifficultyBand::from_score(44.0), DifficultyBand::Strenuous);
        assert_eq!(DifficultyBand::from_score(45.0), DifficultyBand::Extreme);
        assert_eq!(DifficultyBand::Extreme.level(), 8);
        assert_eq!(DifficultyBand::VeryEasy.level(), 1);
    }

    #[test]
    fn test_effort_points() {
        assert_eq!(effort_points(10.0, 500.0), 15.0);
    }

    #[test]
    fn test_flat_route_rating() {
        let stats = track(&[300.0; 11], 1.0);
        let rating = rate(&stats);
        assert_eq!(rating.band, DifficultyBand::Moderate);
        assert_eq!(rating.label, "Moderate");
        assert_eq!(rating.terrain_tags, "Mostly Flat");
        assert!((rating.equivalent_flat_km - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_high_altitude_and_steep() {
        // 200 m rise every 500 m (40% grade) in the first three segments, then flat
        let mut elevations = vec![2400.0, 2600.0, 2800.0];
        elevations.extend(std::iter::repeat(3000.0).take(17));
        let stats = track(&elevations, 0.5);
        let tags = terrain_tags(&stats);
        assert_eq!(tags, vec!["High Altitude", "Steep Start"]);
    }

    #[test]
    fn test_alpine_is_exclusive_with_high_altitude() {
        let stats = track(&[1600.0; 5], 1.0);
        assert_eq!(terrain_tags(&stats), vec!["Alpine", "Mostly Flat"]);
    }

    #[test]
    fn test_uphill_finish() {
        let mut elevations = vec![100.0; 20];
        elevations.push(300.0);
        // 200 m over the last 100 m segment; flat elsewhere
        let stats = track(&elevations, 0.1);
        let tags = terrain_tags(&stats);
        assert!(tags.contains(&"Uphill Finish"));
        assert!(!tags.contains(&"Steep Start"));
    }

    #[test]
    fn test_default_tag() {
        // Rolling 5% grades: neither flat, steep, alpine nor edge-heavy
        let elevations: Vec<f64> = (0..41)
            .map(|i| {
                let wave = if (i / 5) % 2 == 0 { i % 5 } else { 5 - i % 5 };
                50.0 - wave as f64 * 10.0
            })
            .collect();
        let stats = track(&elevations, 0.2);
        assert_eq!(terrain_tags(&stats), vec![DEFAULT_TERRAIN_TAG]);
    }
}
