//! Plan a synthetic day hike and print the route report

use chrono::NaiveDate;
use trailpace::profile::{Fitness, HikerProfile, PackWeight, Pace};
use trailpace::types::{AnalysisRequest, PlannedStart, SmoothingLevel, TrackPoint};
use trailpace::weather::{ForecastProvider, WeatherSnapshot};
use trailpace::{ComputeError, RoutePlanner};

/// Fixed summer forecast for any location
struct SummerForecast;

impl ForecastProvider for SummerForecast {
    fn fetch_forecast(
        &self,
        _lat: f64,
        _lon: f64,
        date: NaiveDate,
    ) -> Result<WeatherSnapshot, ComputeError> {
        let at = |h, m| {
            date.and_hms_opt(h, m, 0)
                .ok_or_else(|| ComputeError::InvalidTime(format!("{h}:{m}")))
        };
        Ok(WeatherSnapshot {
            max_temp: 27.0,
            min_temp: 14.0,
            feels_like_max: 28.5,
            precipitation_mm: 0.4,
            precipitation_probability_pct: 20.0,
            wind_speed_kph: 14.0,
            wind_gusts_kph: 32.0,
            weather_code: 2,
            pressure_hpa: 1016.0,
            cloud_cover_pct: 35.0,
            humidity_pct: 48.0,
            uv_index: 7.5,
            sunrise: at(5, 52)?,
            sunset: at(21, 8)?,
        })
    }
}

/// Out-and-back ridge walk: climb 900 m over 7 km, then return
fn ridge_track() -> Vec<TrackPoint> {
    let half = 140;
    (0..=2 * half)
        .map(|i| {
            let step = if i <= half { i } else { 2 * half - i };
            let t = step as f64 / half as f64;
            let ele = 1200.0 + 900.0 * t + 15.0 * (i as f64 * 0.7).sin();
            TrackPoint::new(46.55 + i as f64 * 0.00045, 7.95 + t * 0.01, ele)
        })
        .collect()
}

fn main() -> Result<(), ComputeError> {
    let date = NaiveDate::from_ymd_opt(2024, 7, 20)
        .ok_or_else(|| ComputeError::InvalidTime("2024-07-20".to_string()))?;
    let time = chrono::NaiveTime::from_hms_opt(9, 30, 0)
        .ok_or_else(|| ComputeError::InvalidTime("09:30".to_string()))?;

    let request = AnalysisRequest {
        profile: HikerProfile::new(Fitness::Active, Pace::Steady, PackWeight::Medium, true),
        smoothing: SmoothingLevel::Medium,
        downsample_target: Some(200),
        planned_start: Some(PlannedStart::new(date, time)),
    };

    let mut planner = RoutePlanner::new(ridge_track(), request)?;
    planner.refresh_weather(&SummerForecast)?;

    for estimate in &planner.result().estimates {
        eprintln!("{:>9}: {} min", estimate.method.name(), estimate.time_minutes);
    }

    println!("{}", planner.report_json()?);
    Ok(())
}
