//! Smart aggregation of time estimates
//!
//! Reports the mean of the estimates unless it drifts more than 10% from the
//! median, in which case an outlier is assumed and the median is reported.

use crate::types::{AggregateMethod, SmartAggregate, TimeEstimation};

/// Relative mean/median gap above which the median wins
pub const OUTLIER_DEVIATION_THRESHOLD: f64 = 0.10;

/// Aggregator over estimate durations
pub struct Aggregator;

impl Aggregator {
    /// Aggregate a set of estimates
    pub fn aggregate(estimates: &[TimeEstimation]) -> SmartAggregate {
        let minutes: Vec<f64> = estimates.iter().map(|e| e.time_minutes as f64).collect();
        Self::aggregate_minutes(&minutes)
    }

    /// Aggregate raw durations (minutes). Never fails; an empty slice gives zero.
    pub fn aggregate_minutes(values: &[f64]) -> SmartAggregate {
        if values.is_empty() {
            return SmartAggregate {
                value_minutes: 0.0,
                method: AggregateMethod::Mean,
                mean_minutes: 0.0,
                median_minutes: 0.0,
                relative_deviation: 0.0,
                reason: "No estimates available".to_string(),
            };
        }

        let mean = mean(values);
        let median = median(values);
        let deviation = relative_deviation(mean, median);

        if deviation > OUTLIER_DEVIATION_THRESHOLD {
            SmartAggregate {
                value_minutes: median,
                method: AggregateMethod::Median,
                mean_minutes: mean,
                median_minutes: median,
                relative_deviation: deviation,
                reason: format!(
                    "Outliers detected: mean deviates {:.0}% from median, using median",
                    deviation * 100.0
                ),
            }
        } else {
            SmartAggregate {
                value_minutes: mean,
                method: AggregateMethod::Mean,
                mean_minutes: mean,
                median_minutes: median,
                relative_deviation: deviation,
                reason: format!(
                    "Methods align: mean within {:.0}% of median, using mean",
                    deviation * 100.0
                ),
            }
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard median; averages the two middle values for even counts
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// |mean - median| / median, with a zero median treated as aligned only when the mean is zero too
fn relative_deviation(mean: f64, median: f64) -> f64 {
    if median > 0.0 {
        (mean - median).abs() / median
    } else if mean == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EstimationMethod;
    use pretty_assertions::assert_eq;

    fn estimates(values: &[u32]) -> Vec<TimeEstimation> {
        values
            .iter()
            .zip(EstimationMethod::ALL.iter())
            .map(|(v, m)| TimeEstimation {
                method: *m,
                time_minutes: *v,
                description: String::new(),
            })
            .collect()
    }

    #[test]
    fn test_outlier_switches_to_median() {
        let agg = Aggregator::aggregate(&estimates(&[100, 100, 100, 100, 500]));
        assert_eq!(agg.method, AggregateMethod::Median);
        assert_eq!(agg.value_minutes, 100.0);
        assert_eq!(agg.mean_minutes, 180.0);
        assert!((agg.relative_deviation - 0.8).abs() < 1e-12);
        assert!(agg.reason.contains("80%"));
    }

    #[test]
    fn test_aligned_methods_use_mean() {
        let agg = Aggregator::aggregate(&estimates(&[100, 102, 98, 101, 99]));
        assert_eq!(agg.method, AggregateMethod::Mean);
        assert_eq!(agg.value_minutes, 100.0);
        assert_eq!(agg.median_minutes, 100.0);
        assert_eq!(agg.relative_deviation, 0.0);
        assert!(agg.reason.starts_with("Methods align"));
    }

    #[test]
    fn test_even_count_median() {
        let agg = Aggregator::aggregate_minutes(&[10.0, 40.0, 20.0, 30.0]);
        assert_eq!(agg.median_minutes, 25.0);
        assert_eq!(agg.method, AggregateMethod::Mean);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // mean 110, median 100 -> exactly 10%
        let agg = Aggregator::aggregate_minutes(&[100.0, 100.0, 130.0]);
        assert!((agg.relative_deviation - 0.1).abs() < 1e-12);
        assert_eq!(agg.method, AggregateMethod::Mean);
    }

    #[test]
    fn test_empty_input_degrades_gracefully() {
        let agg = Aggregator::aggregate(&[]);
        assert_eq!(agg.value_minutes, 0.0);
        assert_eq!(agg.reason, "No estimates available");
    }

    #[test]
    fn test_all_zero_estimates() {
        let agg = Aggregator::aggregate_minutes(&[0.0; 5]);
        assert_eq!(agg.value_minutes, 0.0);
        assert_eq!(agg.method, AggregateMethod::Mean);
    }
}
