//! Pipeline orchestration
//!
//! This module provides the public API for Trailpace. [`compute`] runs the
//! full analysis as one pure function of its inputs; [`RoutePlanner`] owns the
//! inputs on behalf of a shell (CLI, FFI, UI) and recomputes on every change.

use chrono::NaiveDate;

use crate::aggregator::Aggregator;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::estimators::estimate_all;
use crate::profile::HikerProfile;
use crate::reducer::TrackReducer;
use crate::smoother::{TrackSmoother, DEFAULT_DOWNSAMPLE_TARGET};
use crate::types::{
    AggregateMethod, AnalysisFlag, AnalysisRequest, AnalysisResult, PlannedStart, SmoothingLevel,
    TrackPoint,
};
use crate::weather::{ForecastOutcome, ForecastProvider, ForecastTicket, ForecastTracker, WeatherSnapshot};
use crate::{bio, difficulty, safety};

/// Run the full analysis for one track.
///
/// Pipeline stages:
/// 1. TrackReducer - Distance, elevation and slope statistics
/// 2. TrackSmoother - Display series at the requested smoothing level
/// 3. Estimators - Five independent time estimates
/// 4. Aggregator - Outlier-aware smart estimate
/// 5. Derived metrics - Difficulty, calories/water, daylight safety
///
/// Weather is optional; every field is computed without it.
///
/// # Example
/// ```ignore
/// let result = compute(&points, &AnalysisRequest::default(), None)?;
/// println!("{} min", result.smart.value_minutes);
/// ```
pub fn compute(
    points: &[TrackPoint],
    request: &AnalysisRequest,
    weather: Option<&WeatherSnapshot>,
) -> Result<AnalysisResult, ComputeError> {
    // Stage 1: Reduce raw points
    let stats = TrackReducer::reduce(points)?;

    // Stage 2: Smooth for display
    let smoother = TrackSmoother::new(request.downsample_target.unwrap_or(DEFAULT_DOWNSAMPLE_TARGET));
    let smoothed = smoother.smooth(&stats.points, request.smoothing);

    // Stage 3: Estimate
    let profile = &request.profile;
    let estimates = estimate_all(&stats, profile);

    // Stage 4: Aggregate
    let smart = Aggregator::aggregate(&estimates);

    // Stage 5: Derived metrics
    let difficulty = difficulty::rate(&stats);
    let bio = bio::estimate(&stats, profile, smart.value_minutes, weather.map(|w| w.max_temp));
    let safety = request
        .planned_start
        .as_ref()
        .map(|start| safety::assess(start, smart.value_minutes, weather.map(|w| w.sunset)));

    let mut flags = Vec::new();
    if stats.points.len() < 2 {
        flags.push(AnalysisFlag::SinglePointTrack);
    }
    if smart.method == AggregateMethod::Median {
        flags.push(AnalysisFlag::OutliersDetected);
    }
    match &safety {
        None => flags.push(AnalysisFlag::NoPlannedStart),
        Some(s) if s.sunset_time.is_none() => flags.push(AnalysisFlag::SunsetUnavailable),
        Some(_) => {}
    }

    tracing::debug!(
        smart_minutes = smart.value_minutes,
        method = ?smart.method,
        difficulty = %difficulty.label,
        "analysis complete"
    );

    Ok(AnalysisResult {
        stats,
        smoothed,
        estimates,
        smart,
        difficulty,
        bio,
        safety,
        flags,
    })
}

/// Analyze JSON inputs and return the report JSON (stateless, one-shot).
///
/// # Arguments
/// * `track_json` - JSON array of `{lat, lon, ele}` points
/// * `request_json` - JSON [`AnalysisRequest`]; empty string for defaults
/// * `weather_json` - JSON [`WeatherSnapshot`]; empty string when unavailable
pub fn analyze_json(
    track_json: &str,
    request_json: &str,
    weather_json: &str,
) -> Result<String, ComputeError> {
    let points: Vec<TrackPoint> = serde_json::from_str(track_json)?;
    let request: AnalysisRequest = if request_json.trim().is_empty() {
        AnalysisRequest::default()
    } else {
        serde_json::from_str(request_json)?
    };
    let weather: Option<WeatherSnapshot> = if weather_json.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(weather_json)?)
    };

    let result = compute(&points, &request, weather.as_ref())?;
    ReportEncoder::new().encode_to_json(&result, weather.as_ref())
}

/// Input-owning planner that recomputes on every change.
///
/// Holds the current track, request and weather; each setter reruns
/// [`compute`] so [`RoutePlanner::result`] always reflects the latest inputs.
pub struct RoutePlanner {
    track: Vec<TrackPoint>,
    request: AnalysisRequest,
    forecasts: ForecastTracker,
    weather_failed: bool,
    result: AnalysisResult,
    encoder: ReportEncoder,
}

impl RoutePlanner {
    /// Create a planner for a track; fails on an empty track
    pub fn new(track: Vec<TrackPoint>, request: AnalysisRequest) -> Result<Self, ComputeError> {
        let result = compute(&track, &request, None)?;
        Ok(Self {
            track,
            request,
            forecasts: ForecastTracker::new(),
            weather_failed: false,
            result,
            encoder: ReportEncoder::new(),
        })
    }

    /// Replace the track. Weather belongs to the old start point and is dropped.
    pub fn set_track(&mut self, track: Vec<TrackPoint>) -> Result<&AnalysisResult, ComputeError> {
        let result = compute(&track, &self.request, None)?;
        self.track = track;
        self.forecasts.clear();
        self.weather_failed = false;
        self.result = result;
        Ok(&self.result)
    }

    pub fn set_profile(&mut self, profile: HikerProfile) -> Result<&AnalysisResult, ComputeError> {
        self.request.profile = profile;
        self.recompute()
    }

    pub fn set_smoothing(&mut self, level: SmoothingLevel) -> Result<&AnalysisResult, ComputeError> {
        self.request.smoothing = level;
        self.recompute()
    }

    /// Change the planned start. A different date invalidates the forecast.
    pub fn set_planned_start(
        &mut self,
        start: Option<PlannedStart>,
    ) -> Result<&AnalysisResult, ComputeError> {
        let old_date = self.planned_date();
        self.request.planned_start = start;
        if self.planned_date() != old_date {
            self.forecasts.clear();
            self.weather_failed = false;
        }
        self.recompute()
    }

    /// Start a forecast request for the track start on the planned date.
    ///
    /// Returns `None` without a planned start. Issuing a new request makes
    /// every earlier ticket stale.
    pub fn begin_weather_request(&mut self) -> Option<ForecastTicket> {
        let date = self.planned_date()?;
        let first = self.track.first()?;
        Some(self.forecasts.begin(first.lat, first.lon, date))
    }

    /// Deliver a forecast result and recompute when it was the latest request
    pub fn complete_weather_request(
        &mut self,
        ticket: &ForecastTicket,
        result: Result<WeatherSnapshot, ComputeError>,
    ) -> Result<ForecastOutcome, ComputeError> {
        let outcome = self.forecasts.complete(ticket, result);
        match outcome {
            ForecastOutcome::Applied => self.weather_failed = false,
            ForecastOutcome::Unavailable(_) => self.weather_failed = true,
            ForecastOutcome::Superseded => return Ok(outcome),
        }
        self.recompute()?;
        Ok(outcome)
    }

    /// Fetch and apply weather from a synchronous provider
    pub fn refresh_weather(
        &mut self,
        provider: &dyn ForecastProvider,
    ) -> Result<Option<ForecastOutcome>, ComputeError> {
        let Some(ticket) = self.begin_weather_request() else {
            return Ok(None);
        };
        let query = ticket.query;
        let result = provider.fetch_forecast(query.lat, query.lon, query.date);
        self.complete_weather_request(&ticket, result).map(Some)
    }

    /// Latest analysis
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.forecasts.current()
    }

    /// Latest analysis as report JSON
    pub fn report_json(&self) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(&self.result, self.weather())
    }

    fn planned_date(&self) -> Option<NaiveDate> {
        self.request.planned_start.map(|s| s.date)
    }

    fn recompute(&mut self) -> Result<&AnalysisResult, ComputeError> {
        let mut result = compute(&self.track, &self.request, self.forecasts.current())?;
        if self.weather_failed {
            result.flags.push(AnalysisFlag::WeatherUnavailable);
        }
        self.result = result;
        Ok(&self.result)
    }
}
