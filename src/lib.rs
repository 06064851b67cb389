//! Trailpace - Route analytics and hiking-time estimation engine
//!
//! Trailpace turns a GPS track into route statistics, five independent
//! hiking-time estimates, an outlier-aware combined estimate, a difficulty
//! rating and bio/safety metrics through a deterministic pipeline:
//! reduction → smoothing → estimation → aggregation → derived metrics →
//! report encoding.
//!
//! Weather is optional everywhere. When present it refines water needs and
//! enables the daylight check.

pub mod aggregator;
pub mod bio;
pub mod difficulty;
pub mod encoder;
pub mod error;
pub mod estimators;
pub mod geo;
pub mod pipeline;
pub mod profile;
pub mod reducer;
pub mod safety;
pub mod schema;
pub mod smoother;
pub mod types;
pub mod weather;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use error::ComputeError;
pub use pipeline::{analyze_json, compute, RoutePlanner};
pub use profile::{Fitness, HikerProfile, PackWeight, Pace};
pub use types::{
    AnalysisFlag, AnalysisRequest, AnalysisResult, PlannedStart, RouteReport, RouteStats,
    SmoothingLevel, TrackPoint,
};
pub use weather::{ForecastProvider, ForecastTracker, WeatherSnapshot};

// Schema exports
pub use schema::{PointValidationError, TrackInput, SCHEMA_VERSION};

/// Trailpace version embedded in all reports
pub const TRAILPACE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "trailpace";
