//! Weather collaborator interface
//!
//! The forecast itself comes from outside the engine. This module defines the
//! snapshot it delivers, the provider trait a shell implements, and a
//! last-request-wins tracker so a slow response for an old location or date
//! never overrides a newer selection.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ComputeError;

/// Daily forecast for one location and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Daily maximum temperature (°C)
    pub max_temp: f64,
    /// Daily minimum temperature (°C)
    pub min_temp: f64,
    /// Apparent maximum temperature (°C)
    pub feels_like_max: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability_pct: f64,
    pub wind_speed_kph: f64,
    pub wind_gusts_kph: f64,
    /// WMO weather interpretation code
    pub weather_code: u8,
    pub pressure_hpa: f64,
    pub cloud_cover_pct: f64,
    pub humidity_pct: f64,
    pub uv_index: f64,
    /// Local time
    pub sunrise: NaiveDateTime,
    /// Local time
    pub sunset: NaiveDateTime,
}

impl WeatherSnapshot {
    /// Short text for the snapshot's weather code
    pub fn condition(&self) -> &'static str {
        describe_weather_code(self.weather_code)
    }
}

/// Short description of a WMO weather code
pub fn describe_weather_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 => "Slight rain",
        63 => "Rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 => "Slight snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Source of daily forecasts
pub trait ForecastProvider {
    /// Forecast for a location and date; fails with
    /// [`ComputeError::WeatherUnavailable`] on network errors or missing data
    fn fetch_forecast(
        &self,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> Result<WeatherSnapshot, ComputeError>;
}

/// Location and date a forecast was asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery {
    pub lat: f64,
    pub lon: f64,
    pub date: NaiveDate,
}

/// Handle for one in-flight forecast request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastTicket {
    generation: u64,
    pub query: ForecastQuery,
}

/// What happened to a completed forecast request
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Newest request succeeded; snapshot is now current
    Applied,
    /// Newest request failed; weather is cleared
    Unavailable(String),
    /// A newer request was issued meanwhile; result dropped
    Superseded,
}

/// Tracks the single outstanding forecast request (last request wins)
#[derive(Debug, Default)]
pub struct ForecastTracker {
    latest: u64,
    current: Option<WeatherSnapshot>,
}

impl ForecastTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request; any earlier ticket becomes stale
    pub fn begin(&mut self, lat: f64, lon: f64, date: NaiveDate) -> ForecastTicket {
        self.latest += 1;
        ForecastTicket {
            generation: self.latest,
            query: ForecastQuery { lat, lon, date },
        }
    }

    /// Whether `ticket` is still the newest request
    pub fn is_current(&self, ticket: &ForecastTicket) -> bool {
        ticket.generation == self.latest
    }

    /// Deliver the result of a request
    pub fn complete(
        &mut self,
        ticket: &ForecastTicket,
        result: Result<WeatherSnapshot, ComputeError>,
    ) -> ForecastOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.latest,
                "discarding superseded forecast"
            );
            return ForecastOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                self.current = Some(snapshot);
                ForecastOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "weather unavailable, continuing without it");
                self.current = None;
                ForecastOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// Issue and complete a request against a synchronous provider
    pub fn refresh(
        &mut self,
        provider: &dyn ForecastProvider,
        lat: f64,
        lon: f64,
        date: NaiveDate,
    ) -> ForecastOutcome {
        let ticket = self.begin(lat, lon, date);
        let result = provider.fetch_forecast(lat, lon, date);
        self.complete(&ticket, result)
    }

    /// Latest accepted snapshot, if any
    pub fn current(&self) -> Option<&WeatherSnapshot> {
        self.current.as_ref()
    }

    /// Drop the current snapshot and invalidate in-flight requests
    pub fn clear(&mut self) {
        self.latest += 1;
        self.current = None;
    }
}
