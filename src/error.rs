//! Error types for Trailpace

use thiserror::Error;

/// Errors that can occur during route analysis
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Track contains no points")]
    EmptyTrack,

    #[error("Weather unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("Failed to parse track input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid smoothing level: {0} (expected 0-4)")]
    InvalidSmoothingLevel(u8),

    #[error("Invalid hiker profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),
}
