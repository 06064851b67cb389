//! Core types for the Trailpace pipeline
//!
//! This module defines the value structures that flow through each stage of the
//! pipeline: raw track points, analyzed points, route statistics, time
//! estimates, the smart aggregate and the derived metrics. Every value is
//! recomputed from scratch on each pass and never mutated afterwards.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;
use crate::profile::HikerProfile;

/// One GPS sample as produced by the upstream track parser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude (degrees)
    #[serde(alias = "latitude")]
    pub lat: f64,
    /// Longitude (degrees)
    #[serde(alias = "lng", alias = "longitude")]
    pub lon: f64,
    /// Elevation (meters)
    #[serde(alias = "elevation", alias = "alt")]
    pub ele: f64,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, ele: f64) -> Self {
        Self { lat, lon, ele }
    }
}

/// Track point enriched with cumulative distance and slope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
    /// Cumulative distance from the first point (km, non-decreasing)
    pub dist_from_start: f64,
    /// Signed grade from the previous point (percent)
    pub slope: f64,
}

impl AnalyzedPoint {
    pub fn track_point(&self) -> TrackPoint {
        TrackPoint::new(self.lat, self.lon, self.ele)
    }
}

/// Signed slope band used for the slope-distance histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlopeBand {
    SteepDown,
    ModerateDown,
    MildDown,
    Flat,
    MildUp,
    ModerateUp,
    SteepUp,
}

impl SlopeBand {
    /// All bands, steepest descent first
    pub const ALL: [SlopeBand; 7] = [
        SlopeBand::SteepDown,
        SlopeBand::ModerateDown,
        SlopeBand::MildDown,
        SlopeBand::Flat,
        SlopeBand::MildUp,
        SlopeBand::ModerateUp,
        SlopeBand::SteepUp,
    ];

    /// Classify a signed grade (percent)
    ///
    /// Band edges: |s| < 2 flat, < 8 mild, < 15 moderate, otherwise steep.
    pub fn classify(slope_pct: f64) -> Self {
        let magnitude = slope_pct.abs();
        let up = slope_pct > 0.0;
        if magnitude < 2.0 {
            SlopeBand::Flat
        } else if magnitude < 8.0 {
            if up {
                SlopeBand::MildUp
            } else {
                SlopeBand::MildDown
            }
        } else if magnitude < 15.0 {
            if up {
                SlopeBand::ModerateUp
            } else {
                SlopeBand::ModerateDown
            }
        } else if up {
            SlopeBand::SteepUp
        } else {
            SlopeBand::SteepDown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlopeBand::SteepDown => "Steep descent (>15%)",
            SlopeBand::ModerateDown => "Moderate descent (8-15%)",
            SlopeBand::MildDown => "Mild descent (2-8%)",
            SlopeBand::Flat => "Flat (<2%)",
            SlopeBand::MildUp => "Mild ascent (2-8%)",
            SlopeBand::ModerateUp => "Moderate ascent (8-15%)",
            SlopeBand::SteepUp => "Steep ascent (>15%)",
        }
    }
}

/// Distance (km) attributed to each slope band
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlopeBreakdown {
    pub steep_down: f64,
    pub moderate_down: f64,
    pub mild_down: f64,
    pub flat: f64,
    pub mild_up: f64,
    pub moderate_up: f64,
    pub steep_up: f64,
}

impl SlopeBreakdown {
    /// Attribute `km` of distance to `band`
    pub fn add(&mut self, band: SlopeBand, km: f64) {
        *self.slot_mut(band) += km;
    }

    pub fn get(&self, band: SlopeBand) -> f64 {
        match band {
            SlopeBand::SteepDown => self.steep_down,
            SlopeBand::ModerateDown => self.moderate_down,
            SlopeBand::MildDown => self.mild_down,
            SlopeBand::Flat => self.flat,
            SlopeBand::MildUp => self.mild_up,
            SlopeBand::ModerateUp => self.moderate_up,
            SlopeBand::SteepUp => self.steep_up,
        }
    }

    /// Sum over all bands (km)
    pub fn total(&self) -> f64 {
        SlopeBand::ALL.iter().map(|b| self.get(*b)).sum()
    }

    /// Share of the total distance in `band` (0-1); 0 for an empty histogram
    pub fn fraction(&self, band: SlopeBand) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.get(band) / total
        } else {
            0.0
        }
    }

    fn slot_mut(&mut self, band: SlopeBand) -> &mut f64 {
        match band {
            SlopeBand::SteepDown => &mut self.steep_down,
            SlopeBand::ModerateDown => &mut self.moderate_down,
            SlopeBand::MildDown => &mut self.mild_down,
            SlopeBand::Flat => &mut self.flat,
            SlopeBand::MildUp => &mut self.mild_up,
            SlopeBand::ModerateUp => &mut self.moderate_up,
            SlopeBand::SteepUp => &mut self.steep_up,
        }
    }
}

/// Aggregate statistics of a reduced track (full precision)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStats {
    /// Total horizontal distance (km)
    pub total_distance_km: f64,
    /// Cumulative ascent above the noise floor (m)
    pub elevation_gain_m: f64,
    /// Cumulative descent above the noise floor (m, positive)
    pub elevation_loss_m: f64,
    pub max_elevation_m: f64,
    pub min_elevation_m: f64,
    /// Mean absolute grade over slope-qualifying segments (percent)
    pub avg_slope_pct: f64,
    pub slope_breakdown: SlopeBreakdown,
    /// Analyzed raw points, one per input point
    pub points: Vec<AnalyzedPoint>,
}

/// Smoothing strength for the display/analysis series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SmoothingLevel {
    None,
    Light,
    Medium,
    Strong,
    Maximum,
}

impl SmoothingLevel {
    /// Moving-average window width in samples
    pub fn window(&self) -> usize {
        match self {
            SmoothingLevel::None => 1,
            SmoothingLevel::Light => 5,
            SmoothingLevel::Medium => 15,
            SmoothingLevel::Strong => 40,
            SmoothingLevel::Maximum => 80,
        }
    }
}

impl Default for SmoothingLevel {
    fn default() -> Self {
        SmoothingLevel::Medium
    }
}

impl TryFrom<u8> for SmoothingLevel {
    type Error = ComputeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SmoothingLevel::None),
            1 => Ok(SmoothingLevel::Light),
            2 => Ok(SmoothingLevel::Medium),
            3 => Ok(SmoothingLevel::Strong),
            4 => Ok(SmoothingLevel::Maximum),
            other => Err(ComputeError::InvalidSmoothingLevel(other)),
        }
    }
}

impl From<SmoothingLevel> for u8 {
    fn from(level: SmoothingLevel) -> u8 {
        level as u8
    }
}

/// Downsampled (and possibly smoothed) copy of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedTrack {
    pub level: SmoothingLevel,
    /// Every `stride`-th input point was kept
    pub stride: usize,
    pub points: Vec<AnalyzedPoint>,
    /// Slope histogram recomputed over the smoothed series
    pub slope_breakdown: SlopeBreakdown,
}

/// Identity of a time-estimation algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    Naismith,
    Tobler,
    Munter,
    Swiss,
    Petzoldt,
}

impl EstimationMethod {
    pub const ALL: [EstimationMethod; 5] = [
        EstimationMethod::Naismith,
        EstimationMethod::Tobler,
        EstimationMethod::Munter,
        EstimationMethod::Swiss,
        EstimationMethod::Petzoldt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EstimationMethod::Naismith => "Naismith's Rule",
            EstimationMethod::Tobler => "Tobler's Hiking Function",
            EstimationMethod::Munter => "Munter Method",
            EstimationMethod::Swiss => "Swiss Hiking Formula (DIN 33466)",
            EstimationMethod::Petzoldt => "Petzoldt Energy Miles",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EstimationMethod::Naismith => {
                "Flat distance at profile speed plus one hour per 600 m of ascent (800 m for very fit hikers)"
            }
            EstimationMethod::Tobler => {
                "Integrates Tobler's slope-dependent walking speed over every raw track segment"
            }
            EstimationMethod::Munter => {
                "Counts each 100 m of ascent as one extra kilometre of effort"
            }
            EstimationMethod::Swiss => {
                "Slower of horizontal and vertical time plus half of the faster one"
            }
            EstimationMethod::Petzoldt => {
                "Energy miles: every 152.4 m of ascent adds one flat-equivalent kilometre"
            }
        }
    }
}

/// Output of one estimation algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEstimation {
    pub method: EstimationMethod,
    /// Estimated total time including breaks (whole minutes)
    pub time_minutes: u32,
    pub description: String,
}

/// Which statistic the smart aggregate reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateMethod {
    Mean,
    Median,
}

/// Outlier-aware combination of the estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartAggregate {
    /// Aggregate duration (minutes, unrounded)
    pub value_minutes: f64,
    pub method: AggregateMethod,
    pub mean_minutes: f64,
    pub median_minutes: f64,
    /// |mean - median| / median
    pub relative_deviation: f64,
    pub reason: String,
}

/// Ordered difficulty bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    VeryEasy,
    Easy,
    Moderate,
    Challenging,
    Hard,
    Demanding,
    Strenuous,
    Extreme,
}

/// Difficulty score with terrain characterisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRating {
    /// Effort points (km + gain/100)
    pub score: f64,
    pub band: DifficultyBand,
    pub label: String,
    pub description: String,
    /// 1-based position of the band (1 = Very Easy)
    pub level: u8,
    /// Presentation colour (hex)
    pub color: String,
    pub terrain_tags: String,
    pub equivalent_flat_km: f64,
}

/// Energy and hydration estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BioMetrics {
    /// kcal
    pub calories: u32,
    /// Liters, one decimal
    pub water_liters: f64,
}

/// Planned start of the hike (local wall-clock time)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStart {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl PlannedStart {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// Daylight safety check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub start_time: NaiveDateTime,
    pub finish_time: NaiveDateTime,
    pub sunset_time: Option<NaiveDateTime>,
    pub is_night_hiking: bool,
    /// Minutes between finish and sunset (negative when finishing after dark)
    pub daylight_margin_minutes: Option<i64>,
}

/// Flags describing degraded or notable conditions of an analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisFlag {
    SinglePointTrack,
    WeatherUnavailable,
    NoPlannedStart,
    SunsetUnavailable,
    OutliersDetected,
}

/// Inputs of one analysis pass besides the track itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    pub profile: HikerProfile,
    pub smoothing: SmoothingLevel,
    /// Target point count of the display series
    pub downsample_target: Option<usize>,
    pub planned_start: Option<PlannedStart>,
}

/// Everything the presentation layer consumes for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub stats: RouteStats,
    pub smoothed: SmoothedTrack,
    pub estimates: Vec<TimeEstimation>,
    pub smart: SmartAggregate,
    pub difficulty: DifficultyRating,
    pub bio: BioMetrics,
    pub safety: Option<SafetyMetrics>,
    pub flags: Vec<AnalysisFlag>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Route summary, rounded for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub distance_km: f64,
    pub elevation_gain_m: i64,
    pub elevation_loss_m: i64,
    pub max_elevation_m: i64,
    pub min_elevation_m: i64,
    pub avg_slope_pct: f64,
    pub point_count: usize,
}

/// One slope band row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSlopeBand {
    pub band: SlopeBand,
    pub label: String,
    pub distance_km: f64,
    pub share_pct: f64,
}

/// One point of the elevation chart series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProfilePoint {
    pub lat: f64,
    pub lon: f64,
    pub distance_km: f64,
    pub ele: f64,
    pub slope: f64,
}

/// One estimate row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEstimate {
    pub method: EstimationMethod,
    pub name: String,
    pub minutes: u32,
    /// `h:mm`
    pub formatted: String,
    pub description: String,
}

/// Smart aggregate for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAggregate {
    pub minutes: u32,
    pub formatted: String,
    pub method: AggregateMethod,
    pub mean_minutes: f64,
    pub median_minutes: f64,
    pub reason: String,
}

/// Difficulty for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDifficulty {
    pub score: f64,
    pub label: String,
    pub description: String,
    pub level: u8,
    pub color: String,
    pub terrain_tags: String,
    pub equivalent_flat_km: f64,
}

/// Safety for display (local `YYYY-MM-DD HH:MM`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSafety {
    pub start: String,
    pub finish: String,
    pub sunset: Option<String>,
    pub is_night_hiking: bool,
    pub daylight_margin_minutes: Option<i64>,
}

/// Weather summary for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWeather {
    pub condition: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub feels_like_max_c: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
    pub wind_speed_kph: f64,
    pub wind_gusts_kph: f64,
    pub uv_index: f64,
    pub sunrise: String,
    pub sunset: String,
}

/// Complete report handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub summary: ReportSummary,
    pub slope_breakdown: Vec<ReportSlopeBand>,
    pub smoothing_level: u8,
    pub elevation_profile: Vec<ReportProfilePoint>,
    pub estimates: Vec<ReportEstimate>,
    pub smart_estimate: ReportAggregate,
    pub difficulty: ReportDifficulty,
    pub bio: BioMetrics,
    pub safety: Option<ReportSafety>,
    pub weather: Option<ReportWeather>,
    pub flags: Vec<String>,
}
