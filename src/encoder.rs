//! Report encoding
//!
//! This module turns a full-precision analysis result into the JSON report
//! consumed by the presentation layer. All display rounding happens here and
//! nowhere earlier in the pipeline.

use crate::error::ComputeError;
use crate::types::{
    AnalysisResult, ReportAggregate, ReportDifficulty, ReportEstimate, ReportProducer,
    ReportProfilePoint, ReportSafety, ReportSlopeBand, ReportSummary, ReportWeather, RouteReport,
    SlopeBand,
};
use crate::weather::WeatherSnapshot;
use crate::{PRODUCER_NAME, TRAILPACE_VERSION};
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

const DISPLAY_DATETIME: &str = "%Y-%m-%d %H:%M";

/// Round to a number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Format whole minutes as `h:mm`
pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

fn whole(value: f64) -> i64 {
    value.round() as i64
}

fn display_time(t: &NaiveDateTime) -> String {
    t.format(DISPLAY_DATETIME).to_string()
}

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an analysis result into a report
    pub fn encode(&self, result: &AnalysisResult, weather: Option<&WeatherSnapshot>) -> RouteReport {
        let stats = &result.stats;

        let summary = ReportSummary {
            distance_km: round_to(stats.total_distance_km, 2),
            elevation_gain_m: whole(stats.elevation_gain_m),
            elevation_loss_m: whole(stats.elevation_loss_m),
            max_elevation_m: whole(stats.max_elevation_m),
            min_elevation_m: whole(stats.min_elevation_m),
            avg_slope_pct: round_to(stats.avg_slope_pct, 1),
            point_count: stats.points.len(),
        };

        let slope_breakdown = SlopeBand::ALL
            .iter()
            .map(|band| ReportSlopeBand {
                band: *band,
                label: band.label().to_string(),
                distance_km: round_to(stats.slope_breakdown.get(*band), 2),
                share_pct: round_to(stats.slope_breakdown.fraction(*band) * 100.0, 1),
            })
            .collect();

        let elevation_profile = result
            .smoothed
            .points
            .iter()
            .map(|p| ReportProfilePoint {
                lat: round_to(p.lat, 6),
                lon: round_to(p.lon, 6),
                distance_km: round_to(p.dist_from_start, 3),
                ele: round_to(p.ele, 1),
                slope: round_to(p.slope, 1),
            })
            .collect();

        let estimates = result
            .estimates
            .iter()
            .map(|e| ReportEstimate {
                method: e.method,
                name: e.method.name().to_string(),
                minutes: e.time_minutes,
                formatted: format_duration(e.time_minutes),
                description: e.description.clone(),
            })
            .collect();

        let smart_minutes = result.smart.value_minutes.round().max(0.0) as u32;
        let smart_estimate = ReportAggregate {
            minutes: smart_minutes,
            formatted: format_duration(smart_minutes),
            method: result.smart.method,
            mean_minutes: round_to(result.smart.mean_minutes, 1),
            median_minutes: round_to(result.smart.median_minutes, 1),
            reason: result.smart.reason.clone(),
        };

        let d = &result.difficulty;
        let difficulty = ReportDifficulty {
            score: round_to(d.score, 1),
            label: d.label.clone(),
            description: d.description.clone(),
            level: d.level,
            color: d.color.clone(),
            terrain_tags: d.terrain_tags.clone(),
            equivalent_flat_km: round_to(d.equivalent_flat_km, 1),
        };

        let safety = result.safety.as_ref().map(|s| ReportSafety {
            start: display_time(&s.start_time),
            finish: display_time(&s.finish_time),
            sunset: s.sunset_time.as_ref().map(display_time),
            is_night_hiking: s.is_night_hiking,
            daylight_margin_minutes: s.daylight_margin_minutes,
        });

        let weather = weather.map(|w| ReportWeather {
            condition: w.condition().to_string(),
            max_temp_c: round_to(w.max_temp, 1),
            min_temp_c: round_to(w.min_temp, 1),
            feels_like_max_c: round_to(w.feels_like_max, 1),
            precipitation_mm: round_to(w.precipitation_mm, 1),
            precipitation_probability_pct: w.precipitation_probability_pct.round(),
            wind_speed_kph: w.wind_speed_kph.round(),
            wind_gusts_kph: w.wind_gusts_kph.round(),
            uv_index: round_to(w.uv_index, 1),
            sunrise: display_time(&w.sunrise),
            sunset: display_time(&w.sunset),
        });

        let flags = result
            .flags
            .iter()
            .filter_map(|f| serde_json::to_value(f).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();

        RouteReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: TRAILPACE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            summary,
            slope_breakdown,
            smoothing_level: u8::from(result.smoothed.level),
            elevation_profile,
            estimates,
            smart_estimate,
            difficulty,
            bio: result.bio,
            safety,
            weather,
            flags,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        result: &AnalysisResult,
        weather: Option<&WeatherSnapshot>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(result, weather);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}
