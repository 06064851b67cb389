//! Track reduction
//!
//! Walks the raw point sequence once and derives cumulative distance,
//! elevation gain/loss with a noise floor, per-segment slope and the
//! slope-distance histogram. Nothing is rounded here.

use crate::error::ComputeError;
use crate::geo;
use crate::types::{AnalyzedPoint, RouteStats, SlopeBand, SlopeBreakdown, TrackPoint};

/// Elevation deltas at or below this magnitude are sensor noise (m)
pub const ELEVATION_NOISE_FLOOR_M: f64 = 0.5;

/// Segments shorter than this carry no slope (km)
pub const MIN_SLOPE_SEGMENT_KM: f64 = 0.001;

/// Signed grade (percent) of a segment, or `None` when the run is too short
pub fn segment_slope_pct(ele_delta_m: f64, distance_km: f64) -> Option<f64> {
    if distance_km > MIN_SLOPE_SEGMENT_KM {
        Some(ele_delta_m / (distance_km * 1000.0) * 100.0)
    } else {
        None
    }
}

/// Track reducer producing [`RouteStats`]
pub struct TrackReducer;

impl TrackReducer {
    /// Reduce an ordered point list to route statistics
    pub fn reduce(points: &[TrackPoint]) -> Result<RouteStats, ComputeError> {
        let first = points.first().ok_or(ComputeError::EmptyTrack)?;

        let mut analyzed = Vec::with_capacity(points.len());
        analyzed.push(AnalyzedPoint {
            lat: first.lat,
            lon: first.lon,
            ele: first.ele,
            dist_from_start: 0.0,
            slope: 0.0,
        });

        let mut total_distance = 0.0;
        let mut gain = 0.0;
        let mut loss = 0.0;
        let mut max_ele = first.ele;
        let mut min_ele = first.ele;
        let mut slope_sum = 0.0;
        let mut slope_count = 0usize;
        let mut breakdown = SlopeBreakdown::default();

        for pair in points.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let seg_km = geo::segment_km(prev, curr);
            total_distance += seg_km;

            let delta = curr.ele - prev.ele;
            if delta.abs() > ELEVATION_NOISE_FLOOR_M {
                if delta > 0.0 {
                    gain += delta;
                } else {
                    loss += -delta;
                }
            }

            max_ele = max_ele.max(curr.ele);
            min_ele = min_ele.min(curr.ele);

            let slope = match segment_slope_pct(delta, seg_km) {
                Some(slope) => {
                    slope_sum += slope.abs();
                    slope_count += 1;
                    breakdown.add(SlopeBand::classify(slope), seg_km);
                    slope
                }
                None => {
                    breakdown.add(SlopeBand::Flat, seg_km);
                    0.0
                }
            };

            analyzed.push(AnalyzedPoint {
                lat: curr.lat,
                lon: curr.lon,
                ele: curr.ele,
                dist_from_start: total_distance,
                slope,
            });
        }

        let avg_slope = if slope_count > 0 {
            slope_sum / slope_count as f64
        } else {
            0.0
        };

        tracing::debug!(
            points = points.len(),
            distance_km = total_distance,
            gain_m = gain,
            loss_m = loss,
            "track reduced"
        );

        Ok(RouteStats {
            total_distance_km: total_distance,
            elevation_gain_m: gain,
            elevation_loss_m: loss,
            max_elevation_m: max_ele,
            min_elevation_m: min_ele,
            avg_slope_pct: avg_slope,
            slope_breakdown: breakdown,
            points: analyzed,
        })
    }
}

/// Positive elevation change above the noise floor over a slice of points (m)
pub fn gain_over(points: &[AnalyzedPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| w[1].ele - w[0].ele)
        .filter(|d| *d > ELEVATION_NOISE_FLOOR_M)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points spaced `step_km` apart heading north from the equator
    fn line(elevations: &[f64], step_km: f64) -> Vec<TrackPoint> {
        let step_deg = step_km / 111.194_926_644_558_73;
        elevations
            .iter()
            .enumerate()
            .map(|(i, ele)| TrackPoint::new(i as f64 * step_deg, 0.0, *ele))
            .collect()
    }

    #[test]
    fn test_empty_track_is_rejected() {
        assert!(matches!(
            TrackReducer::reduce(&[]),
            Err(ComputeError::EmptyTrack)
        ));
    }

    #[test]
    fn test_single_point() {
        let stats = TrackReducer::reduce(&[TrackPoint::new(46.0, 7.0, 1200.0)]).unwrap();
        assert_eq!(stats.total_distance_km, 0.0);
        assert_eq!(stats.elevation_gain_m, 0.0);
        assert_eq!(stats.max_elevation_m, 1200.0);
        assert_eq!(stats.min_elevation_m, 1200.0);
        assert_eq!(stats.points.len(), 1);
        assert_eq!(stats.slope_breakdown.total(), 0.0);
    }

    #[test]
    fn test_flat_track_has_no_gain_or_loss() {
        let stats = TrackReducer::reduce(&line(&[500.0; 11], 1.0)).unwrap();
        assert!((stats.total_distance_km - 10.0).abs() < 1e-6);
        assert_eq!(stats.elevation_gain_m, 0.0);
        assert_eq!(stats.elevation_loss_m, 0.0);
        assert_eq!(stats.avg_slope_pct, 0.0);
        assert!((stats.slope_breakdown.flat - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_noise_floor_suppresses_jitter() {
        let elevations: Vec<f64> = (0..50)
            .map(|i| if i % 2 == 0 { 100.0 } else { 100.3 })
            .collect();
        let stats = TrackReducer::reduce(&line(&elevations, 0.05)).unwrap();
        assert_eq!(stats.elevation_gain_m, 0.0);
        assert_eq!(stats.elevation_loss_m, 0.0);
    }

    #[test]
    fn test_gain_loss_and_extremes() {
        let stats = TrackReducer::reduce(&line(&[100.0, 150.0, 120.0, 180.0], 0.5)).unwrap();
        assert!((stats.elevation_gain_m - 110.0).abs() < 1e-9);
        assert!((stats.elevation_loss_m - 30.0).abs() < 1e-9);
        assert_eq!(stats.max_elevation_m, 180.0);
        assert_eq!(stats.min_elevation_m, 100.0);
    }

    #[test]
    fn test_slope_and_histogram() {
        // +10 m over 100 m = 10% (moderate up), then -20 m over 100 m = -20% (steep down)
        let stats = TrackReducer::reduce(&line(&[0.0, 10.0, -10.0], 0.1)).unwrap();
        assert!((stats.points[1].slope - 10.0).abs() < 1e-6);
        assert!((stats.points[2].slope + 20.0).abs() < 1e-6);
        assert!((stats.avg_slope_pct - 15.0).abs() < 1e-6);
        assert!((stats.slope_breakdown.moderate_up - 0.1).abs() < 1e-9);
        assert!((stats.slope_breakdown.steep_down - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_sub_meter_segments_count_as_flat() {
        let points = vec![
            TrackPoint::new(46.0, 7.0, 100.0),
            TrackPoint::new(46.0, 7.0, 105.0),
            TrackPoint::new(46.0000005, 7.0, 110.0),
        ];
        let stats = TrackReducer::reduce(&points).unwrap();
        assert!(stats.points.iter().all(|p| p.slope == 0.0));
        assert_eq!(stats.avg_slope_pct, 0.0);
        assert!((stats.slope_breakdown.flat - stats.total_distance_km).abs() < 1e-12);
        // Gain still counts even without a slope
        assert!((stats.elevation_gain_m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_from_start_is_cumulative() {
        let stats = TrackReducer::reduce(&line(&[0.0, 5.0, 10.0, 5.0, 0.0], 0.25)).unwrap();
        for pair in stats.points.windows(2) {
            assert!(pair[1].dist_from_start >= pair[0].dist_from_start);
        }
        let last = stats.points.last().unwrap();
        assert!((last.dist_from_start - stats.total_distance_km).abs() < 1e-12);
        assert!((stats.slope_breakdown.total() - stats.total_distance_km).abs() < 1e-9);
    }

    #[test]
    fn test_gain_over_slice() {
        let stats = TrackReducer::reduce(&line(&[0.0, 0.3, 10.0, 5.0, 25.0], 0.1)).unwrap();
        assert!((gain_over(&stats.points) - 29.7).abs() < 1e-9);
        assert_eq!(gain_over(&stats.points[..1]), 0.0);
    }
}
