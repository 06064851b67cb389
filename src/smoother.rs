//! Display/analysis smoothing
//!
//! Downsamples the analyzed track to a bounded size, recomputes slopes on the
//! kept points, then applies a centred moving average to elevation and slope.
//!
//! The moving-average window is clipped at both ends of the series instead of
//! padded, so the first and last samples are smoothed less than interior ones
//! and start/finish elevations stay close to the recorded values.

use crate::reducer::segment_slope_pct;
use crate::types::{AnalyzedPoint, SlopeBand, SlopeBreakdown, SmoothedTrack, SmoothingLevel};

/// Default number of points kept for display
pub const DEFAULT_DOWNSAMPLE_TARGET: usize = 1000;

/// Track smoother
pub struct TrackSmoother {
    target: usize,
}

impl Default for TrackSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNSAMPLE_TARGET)
    }
}

impl TrackSmoother {
    /// Create a smoother with a specific downsample target (minimum 1)
    pub fn new(target: usize) -> Self {
        Self {
            target: target.max(1),
        }
    }

    /// Stride that brings `len` points down to at most the target
    pub fn stride_for(&self, len: usize) -> usize {
        len.div_ceil(self.target).max(1)
    }

    /// Produce the smoothed series for `level`
    pub fn smooth(&self, points: &[AnalyzedPoint], level: SmoothingLevel) -> SmoothedTrack {
        let stride = self.stride_for(points.len());
        let sampled = downsample(points, stride);

        let smoothed = if level == SmoothingLevel::None {
            sampled
        } else {
            moving_average(&sampled, level.window())
        };

        let slope_breakdown = slope_breakdown(&smoothed);

        tracing::debug!(
            input = points.len(),
            output = smoothed.len(),
            stride,
            level = u8::from(level),
            "track smoothed"
        );

        SmoothedTrack {
            level,
            stride,
            points: smoothed,
            slope_breakdown,
        }
    }
}

/// Keep every `stride`-th point and recompute slopes over the new spans.
///
/// `dist_from_start` is carried over from the input.
pub fn downsample(points: &[AnalyzedPoint], stride: usize) -> Vec<AnalyzedPoint> {
    let mut out: Vec<AnalyzedPoint> = Vec::with_capacity(points.len() / stride.max(1) + 1);

    for point in points.iter().step_by(stride.max(1)) {
        let slope = match out.last() {
            Some(prev) => {
                segment_slope_pct(point.ele - prev.ele, point.dist_from_start - prev.dist_from_start)
                    .unwrap_or(0.0)
            }
            None => 0.0,
        };
        out.push(AnalyzedPoint { slope, ..*point });
    }

    out
}

/// Centred moving average over elevation and slope with a clipped window
pub fn moving_average(points: &[AnalyzedPoint], window: usize) -> Vec<AnalyzedPoint> {
    if window <= 1 || points.len() < 2 {
        return points.to_vec();
    }

    // Even windows lean one sample to the right
    let left = (window - 1) / 2;
    let right = window / 2;
    let last = points.len() - 1;

    // Prefix sums keep each window O(1)
    let mut ele_prefix = Vec::with_capacity(points.len() + 1);
    let mut slope_prefix = Vec::with_capacity(points.len() + 1);
    ele_prefix.push(0.0);
    slope_prefix.push(0.0);
    for p in points {
        ele_prefix.push(ele_prefix[ele_prefix.len() - 1] + p.ele);
        slope_prefix.push(slope_prefix[slope_prefix.len() - 1] + p.slope);
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(last);
            let n = (hi - lo + 1) as f64;
            AnalyzedPoint {
                ele: (ele_prefix[hi + 1] - ele_prefix[lo]) / n,
                slope: (slope_prefix[hi + 1] - slope_prefix[lo]) / n,
                ..*p
            }
        })
        .collect()
}

/// Slope histogram over a smoothed series, using `dist_from_start` deltas
pub fn slope_breakdown(points: &[AnalyzedPoint]) -> SlopeBreakdown {
    let mut breakdown = SlopeBreakdown::default();
    for pair in points.windows(2) {
        let seg_km = (pair[1].dist_from_start - pair[0].dist_from_start).max(0.0);
        breakdown.add(SlopeBand::classify(pair[1].slope), seg_km);
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::TrackReducer;
    use crate::types::TrackPoint;

    fn analyzed(elevations: &[f64], step_km: f64) -> Vec<AnalyzedPoint> {
        elevations
            .iter()
            .enumerate()
            .map(|(i, ele)| AnalyzedPoint {
                lat: 0.0,
                lon: 0.0,
                ele: *ele,
                dist_from_start: i as f64 * step_km,
                slope: 999.0,
            })
            .collect()
    }

    #[test]
    fn test_stride_targets_output_size() {
        let smoother = TrackSmoother::new(1000);
        assert_eq!(smoother.stride_for(0), 1);
        assert_eq!(smoother.stride_for(800), 1);
        assert_eq!(smoother.stride_for(1000), 1);
        assert_eq!(smoother.stride_for(1001), 2);
        assert_eq!(smoother.stride_for(5000), 5);
    }

    #[test]
    fn test_level_none_downsamples_and_recomputes_slope() {
        let points = analyzed(&vec![100.0; 5000], 0.01);
        let smoother = TrackSmoother::new(1000);
        let out = smoother.smooth(&points, SmoothingLevel::None);

        assert_eq!(out.stride, 5);
        assert_eq!(out.points.len(), 5000usize.div_ceil(out.stride));
        // The placeholder slope of 999 must not survive
        assert!(out.points.iter().all(|p| p.slope == 0.0));
        assert_eq!(out.points[1].dist_from_start, points[5].dist_from_start);
    }

    #[test]
    fn test_downsampled_slope_uses_new_span() {
        // 1 m rise every 10 m -> 10% regardless of stride
        let elevations: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let points = analyzed(&elevations, 0.01);
        let sampled = downsample(&points, 3);
        assert_eq!(sampled.len(), 10);
        assert_eq!(sampled[0].slope, 0.0);
        for p in &sampled[1..] {
            assert!((p.slope - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_moving_average_clips_window_at_edges() {
        let points = analyzed(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0], 0.1);
        let out = moving_average(&points, 5);

        // Interior: full window of 5
        assert!((out[3].ele - 30.0).abs() < 1e-9);
        // First point averages itself and two right neighbours only
        assert!((out[0].ele - 10.0).abs() < 1e-9);
        // Last point averages itself and two left neighbours only
        assert!((out[6].ele - 50.0).abs() < 1e-9);
        // Distances are untouched
        for (a, b) in out.iter().zip(points.iter()) {
            assert_eq!(a.dist_from_start, b.dist_from_start);
        }
    }

    #[test]
    fn test_even_window_averages_exactly_window_samples() {
        let mut elevations = vec![0.0; 201];
        elevations[100] = 1.0;
        let points = analyzed(&elevations, 0.01);

        for level in [SmoothingLevel::Strong, SmoothingLevel::Maximum] {
            let window = level.window();
            let out = moving_average(&points, window);
            assert!((out[100].ele - 1.0 / window as f64).abs() < 1e-12);
            // Impulse spreads over exactly `window` interior outputs
            let touched = out.iter().filter(|p| p.ele > 0.0).count();
            assert_eq!(touched, window);
        }
    }

    #[test]
    fn test_smoothing_reduces_spikes() {
        let mut elevations = vec![200.0; 41];
        elevations[20] = 260.0;
        let points = analyzed(&elevations, 0.02);

        let light = TrackSmoother::default().smooth(&points, SmoothingLevel::Light);
        let strong = TrackSmoother::default().smooth(&points, SmoothingLevel::Strong);

        assert!((light.points[20].ele - 212.0).abs() < 1e-9);
        assert!(strong.points[20].ele < light.points[20].ele);
        assert_eq!(light.points.len(), points.len());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let stats = TrackReducer::reduce(&[
            TrackPoint::new(0.0, 0.0, 10.0),
            TrackPoint::new(0.001, 0.0, 20.0),
            TrackPoint::new(0.002, 0.0, 10.0),
        ])
        .unwrap();
        let before = stats.points.clone();
        let _ = TrackSmoother::default().smooth(&stats.points, SmoothingLevel::Maximum);
        assert_eq!(stats.points, before);
    }

    #[test]
    fn test_smoothed_breakdown_covers_distance() {
        let elevations: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3).sin() * 40.0).collect();
        let points = analyzed(&elevations, 0.05);
        let out = TrackSmoother::default().smooth(&points, SmoothingLevel::Medium);
        let span = out.points.last().unwrap().dist_from_start;
        assert!((out.slope_breakdown.total() - span).abs() < 1e-9);
    }
}
