//! Daylight safety
//!
//! Adds the expected duration to the planned start and compares the finish
//! with the sunset of the same calendar day, when one is known.

use chrono::{Duration, NaiveDateTime};

use crate::types::{PlannedStart, SafetyMetrics};

/// Finish time and night-hiking check.
///
/// A sunset on a different date than the planned start is ignored.
pub fn assess(
    start: &PlannedStart,
    duration_minutes: f64,
    sunset: Option<NaiveDateTime>,
) -> SafetyMetrics {
    let start_time = start.at();
    let seconds = if duration_minutes.is_finite() {
        (duration_minutes.max(0.0) * 60.0).round() as i64
    } else {
        0
    };
    let finish_time = start_time + Duration::seconds(seconds);

    let sunset_time = sunset.filter(|s| s.date() == start.date);
    let is_night_hiking = sunset_time.is_some_and(|s| finish_time > s);
    let daylight_margin_minutes = sunset_time.map(|s| (s - finish_time).num_minutes());

    SafetyMetrics {
        start_time,
        finish_time,
        sunset_time,
        is_night_hiking,
        daylight_margin_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn start() -> PlannedStart {
        PlannedStart::new(
            NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
    }

    fn sunset(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_finish_after_sunset_is_night_hiking() {
        let safety = assess(&start(), 600.0, Some(sunset(18, 30)));
        assert_eq!(safety.finish_time, sunset(19, 0));
        assert!(safety.is_night_hiking);
        assert_eq!(safety.daylight_margin_minutes, Some(-30));
    }

    #[test]
    fn test_finish_before_sunset() {
        let safety = assess(&start(), 600.0, Some(sunset(19, 30)));
        assert!(!safety.is_night_hiking);
        assert_eq!(safety.daylight_margin_minutes, Some(30));
    }

    #[test]
    fn test_without_sunset() {
        let safety = assess(&start(), 600.0, None);
        assert!(!safety.is_night_hiking);
        assert!(safety.sunset_time.is_none());
        assert!(safety.daylight_margin_minutes.is_none());
    }

    #[test]
    fn test_sunset_of_other_day_is_ignored() {
        let other_day = NaiveDate::from_ymd_opt(2024, 7, 13)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let safety = assess(&start(), 600.0, Some(other_day));
        assert!(safety.sunset_time.is_none());
        assert!(!safety.is_night_hiking);
    }

    #[test]
    fn test_overnight_finish_rolls_date() {
        let safety = assess(&start(), 24.0 * 60.0, Some(sunset(21, 0)));
        assert_eq!(
            safety.finish_time.date(),
            NaiveDate::from_ymd_opt(2024, 7, 13).unwrap()
        );
        assert!(safety.is_night_hiking);
    }
}
