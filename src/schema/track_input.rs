//! Track input parsing and validation
//!
//! The engine accepts points as `{"lat": .., "lon": .., "ele": ..}` objects,
//! either as a JSON array or one object per line (NDJSON). Validation is a
//! separate pass so a shell can report every bad point at once instead of
//! failing on the first.

use crate::error::ComputeError;
use crate::types::TrackPoint;

/// Current track input schema version
pub const SCHEMA_VERSION: &str = "trailpace.track.v1";

/// Parser for track point input
pub struct TrackInput;

impl TrackInput {
    /// Parse a JSON string containing an array of points
    pub fn parse_array(json: &str) -> Result<Vec<TrackPoint>, ComputeError> {
        let points: Vec<TrackPoint> = serde_json::from_str(json)?;
        Ok(points)
    }

    /// Parse NDJSON (newline-delimited JSON) containing one point per line
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<TrackPoint>, ComputeError> {
        let mut points = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<TrackPoint>(trimmed) {
                Ok(point) => points.push(point),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(points)
    }

    /// Validate a batch of points, returning only the failures
    pub fn validate_points(points: &[TrackPoint]) -> Vec<PointValidationResult> {
        points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                validate_point(point)
                    .err()
                    .map(|error| PointValidationResult { index, error })
            })
            .collect()
    }
}

/// Check a single point's coordinates
pub fn validate_point(point: &TrackPoint) -> Result<(), PointValidationError> {
    if !point.lat.is_finite() {
        return Err(PointValidationError::NonFinite { field: "lat" });
    }
    if !point.lon.is_finite() {
        return Err(PointValidationError::NonFinite { field: "lon" });
    }
    if !point.ele.is_finite() {
        return Err(PointValidationError::NonFinite { field: "ele" });
    }
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(PointValidationError::LatitudeOutOfRange(point.lat));
    }
    if !(-180.0..=180.0).contains(&point.lon) {
        return Err(PointValidationError::LongitudeOutOfRange(point.lon));
    }
    Ok(())
}

/// A point that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct PointValidationResult {
    pub index: usize,
    pub error: PointValidationError,
}

/// Validation errors for track points
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointValidationError {
    #[error("Non-finite {field}")]
    NonFinite { field: &'static str },

    #[error("Latitude out of range: {0} (expected -90..=90)")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range: {0} (expected -180..=180)")]
    LongitudeOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"lat": 46.0, "lon": 7.0, "ele": 1200.0},
            {"lat": 46.001, "lon": 7.0, "ele": 1210.5}
        ]"#;
        let points = TrackInput::parse_array(json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], TrackPoint::new(46.001, 7.0, 1210.5));
    }

    #[test]
    fn test_parse_array_accepts_aliases() {
        let json = r#"[{"latitude": 46.0, "lng": 7.0, "elevation": 900.0}]"#;
        let points = TrackInput::parse_array(json).unwrap();
        assert_eq!(points, vec![TrackPoint::new(46.0, 7.0, 900.0)]);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = "{\"lat\": 46.0, \"lon\": 7.0, \"ele\": 1.0}\n\n  \n{\"lat\": 46.1, \"lon\": 7.1, \"ele\": 2.0}\n";
        let points = TrackInput::parse_ndjson(ndjson).unwrap();
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = "{\"lat\": 46.0, \"lon\": 7.0, \"ele\": 1.0}\n{\"lat\": 46.1}\n";
        let err = TrackInput::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_validate_points() {
        let points = vec![
            TrackPoint::new(46.0, 7.0, 1000.0),
            TrackPoint::new(95.0, 7.0, 1000.0),
            TrackPoint::new(46.0, 190.0, 1000.0),
            TrackPoint::new(46.0, 7.0, f64::NAN),
        ];
        let failures = TrackInput::validate_points(&points);

        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].error, PointValidationError::LatitudeOutOfRange(95.0));
        assert_eq!(failures[1].error, PointValidationError::LongitudeOutOfRange(190.0));
        assert_eq!(
            failures[2].error,
            PointValidationError::NonFinite { field: "ele" }
        );
    }

    #[test]
    fn test_boundary_coordinates_are_valid() {
        assert!(validate_point(&TrackPoint::new(-90.0, 180.0, -400.0)).is_ok());
        assert!(validate_point(&TrackPoint::new(90.0, -180.0, 8848.0)).is_ok());
    }
}
