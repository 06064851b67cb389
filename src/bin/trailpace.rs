//! Trailpace CLI - Command-line interface for the Trailpace engine
//!
//! Commands:
//! - analyze: Analyze a track and print the route report
//! - validate: Validate track points
//! - schema: Print input/output schema information
//! - doctor: Diagnose configuration and input files

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trailpace::encoder::{ReportEncoder, REPORT_VERSION};
use trailpace::profile::{Fitness, PackWeight, Pace};
use trailpace::schema::{TrackInput, SCHEMA_VERSION};
use trailpace::types::{AnalysisRequest, PlannedStart, RouteReport, SmoothingLevel, TrackPoint};
use trailpace::weather::WeatherSnapshot;
use trailpace::{compute, ComputeError, PRODUCER_NAME, TRAILPACE_VERSION};

/// Start time used when only a date is given
const DEFAULT_START_TIME: &str = "08:00";

/// Trailpace - Route analytics and hiking-time estimation
#[derive(Parser)]
#[command(name = "trailpace")]
#[command(author = "Trailpace Contributors")]
#[command(version = TRAILPACE_VERSION)]
#[command(about = "Analyze GPS tracks and estimate hiking times", long_about = None)]
struct Cli {
    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a track and print the route report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Analysis request file (JSON); flags below override its fields
        #[arg(long)]
        request: Option<PathBuf>,

        /// Weather snapshot file (JSON)
        #[arg(long)]
        weather: Option<PathBuf>,

        #[arg(long, value_enum)]
        fitness: Option<Fitness>,

        #[arg(long, value_enum)]
        pace: Option<Pace>,

        #[arg(long, value_enum)]
        pack_weight: Option<PackWeight>,

        /// Add rest breaks to walking estimates
        #[arg(long)]
        breaks: bool,

        /// Smoothing level (0-4)
        #[arg(long)]
        smoothing: Option<u8>,

        /// Maximum points in the smoothed profile
        #[arg(long)]
        downsample: Option<usize>,

        /// Planned start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,

        /// Planned start time (HH:MM)
        #[arg(long)]
        start_time: Option<String>,
    },

    /// Validate track points
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and input files
    Doctor {
        /// Check a weather snapshot file
        #[arg(long)]
        weather: Option<PathBuf>,

        /// Check an analysis request file
        #[arg(long)]
        request: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of points
    Json,
    /// Newline-delimited JSON (one point per line)
    Ndjson,
    /// GPX 1.1 file (tracks, then routes)
    Gpx,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Single-line JSON followed by a newline
    Ndjson,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (track points)
    Input,
    /// Output schema (route report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "trailpace=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), TrailpaceCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            input_format,
            output_format,
            request,
            weather,
            fitness,
            pace,
            pack_weight,
            breaks,
            smoothing,
            downsample,
            start_date,
            start_time,
        } => {
            let mut request = match request {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => AnalysisRequest::default(),
            };
            let overrides = RequestOverrides {
                fitness,
                pace,
                pack_weight,
                breaks,
                smoothing,
                downsample,
                start_date,
                start_time,
            };
            overrides.apply(&mut request)?;

            let weather = match weather {
                Some(path) => Some(serde_json::from_str::<WeatherSnapshot>(
                    &fs::read_to_string(path)?,
                )?),
                None => None,
            };

            cmd_analyze(
                &input,
                &output,
                input_format,
                output_format,
                &request,
                weather.as_ref(),
            )
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor {
            weather,
            request,
            json,
        } => cmd_doctor(weather.as_deref(), request.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

/// Command-line values that override the request file
struct RequestOverrides {
    fitness: Option<Fitness>,
    pace: Option<Pace>,
    pack_weight: Option<PackWeight>,
    breaks: bool,
    smoothing: Option<u8>,
    downsample: Option<usize>,
    start_date: Option<String>,
    start_time: Option<String>,
}

impl RequestOverrides {
    fn apply(self, request: &mut AnalysisRequest) -> Result<(), TrailpaceCliError> {
        if let Some(fitness) = self.fitness {
            request.profile.fitness = fitness;
        }
        if let Some(pace) = self.pace {
            request.profile.pace = pace;
        }
        if let Some(pack_weight) = self.pack_weight {
            request.profile.pack_weight = pack_weight;
        }
        if self.breaks {
            request.profile.include_breaks = true;
        }
        if let Some(level) = self.smoothing {
            request.smoothing = SmoothingLevel::try_from(level)?;
        }
        if self.downsample.is_some() {
            request.downsample_target = self.downsample;
        }

        match (self.start_date, self.start_time) {
            (Some(date), time) => {
                let date = parse_date(&date)?;
                let time = parse_time(time.as_deref().unwrap_or(DEFAULT_START_TIME))?;
                request.planned_start = Some(PlannedStart::new(date, time));
            }
            (None, Some(time)) => {
                let time = parse_time(&time)?;
                match request.planned_start.as_mut() {
                    Some(start) => start.time = time,
                    None => return Err(TrailpaceCliError::MissingStartDate),
                }
            }
            (None, None) => {}
        }

        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ComputeError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| ComputeError::InvalidTime(format!("{value}: {e}")))
}

fn parse_time(value: &str) -> Result<NaiveTime, ComputeError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| ComputeError::InvalidTime(format!("{value}: {e}")))
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    request: &AnalysisRequest,
    weather: Option<&WeatherSnapshot>,
) -> Result<(), TrailpaceCliError> {
    let points = read_points(input, &input_format)?;
    if points.is_empty() {
        return Err(TrailpaceCliError::NoPoints);
    }

    let result = compute(&points, request, weather)?;
    let report = ReportEncoder::new().encode(&result, weather);

    let output_data = format_output(&report, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), TrailpaceCliError> {
    let points = read_points(input, &input_format)?;

    let results = TrackInput::validate_points(&points);

    let report = ValidationReport {
        total_points: points.len(),
        valid_points: points.len() - results.len(),
        invalid_points: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total points:   {}", report.total_points);
        println!("Valid points:   {}", report.valid_points);
        println!("Invalid points: {}", report.invalid_points);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Point {}: {}", err.index, err.error);
            }
        }
    }

    if points.is_empty() {
        Err(TrailpaceCliError::NoPoints)
    } else if report.invalid_points > 0 {
        Err(TrailpaceCliError::ValidationFailed(report.invalid_points))
    } else {
        Ok(())
    }
}

fn cmd_doctor(
    weather: Option<&Path>,
    request: Option<&Path>,
    json: bool,
) -> Result<(), TrailpaceCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "trailpace_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Trailpace version {}", TRAILPACE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}, report version {}", SCHEMA_VERSION, REPORT_VERSION),
    });

    if let Some(path) = weather {
        checks.push(check_json_file::<WeatherSnapshot>("weather", path, |w| {
            format!("Weather snapshot valid ({}, max {:.1} °C)", w.condition(), w.max_temp)
        }));
    }

    if let Some(path) = request {
        checks.push(check_json_file::<AnalysisRequest>("request", path, |r| {
            format!(
                "Request valid ({} / {} / {}, smoothing {})",
                r.profile.fitness,
                r.profile.pace,
                r.profile.pack_weight,
                u8::from(r.smoothing)
            )
        }));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: TRAILPACE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Trailpace Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(TrailpaceCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_json_file<T: serde::de::DeserializeOwned>(
    name: &str,
    path: &Path,
    describe: impl Fn(&T) -> String,
) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: format!("{} file does not exist", name),
        };
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(value) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Ok,
                message: describe(&value),
            },
            Err(e) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Error,
                message: format!("Invalid {} JSON: {}", name, e),
            },
        },
        Err(e) => DoctorCheck {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: format!("Cannot read {} file: {}", name, e),
        },
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), TrailpaceCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("A track is an ordered list of GPS samples:");
                println!();
                println!("- lat: latitude in degrees (alias: latitude)");
                println!("- lon: longitude in degrees (aliases: lng, longitude)");
                println!("- ele: elevation in meters (aliases: elevation, alt)");
                println!();
                println!("Formats: JSON array, NDJSON (one point per line), GPX 1.1");
                println!("GPX track segments are read first; routes are used when no track exists.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: route report {}", REPORT_VERSION);
                println!();
                println!("- report_version, producer {{ name, version, instance_id }}, computed_at_utc");
                println!("- summary: {{ distance_km, elevation_gain_m, elevation_loss_m, max/min_elevation_m, avg_slope_pct }}");
                println!("- slope_breakdown: seven bands from steep_down to steep_up with km and share");
                println!("- elevation_profile: smoothed, downsampled {{ lat, lon, distance_km, ele, slope }}");
                println!("- estimates: naismith, tobler, munter, swiss, petzoldt (minutes and h:mm)");
                println!("- smart_estimate: {{ minutes, method (MEAN|MEDIAN), reason }}");
                println!("- difficulty: {{ score, label, level, color, terrain_tags, equivalent_flat_km }}");
                println!("- bio: {{ calories, water_liters }}");
                println!("- safety: {{ start, finish, sunset, is_night_hiking, daylight_margin_minutes }} (with a planned start)");
                println!("- weather: forecast summary (when supplied)");
                println!("- flags: analysis notes such as no_planned_start or weather_unavailable");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, TrailpaceCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_points(input: &Path, format: &InputFormat) -> Result<Vec<TrackPoint>, TrailpaceCliError> {
    match format {
        InputFormat::Json => Ok(TrackInput::parse_array(&read_input(input)?)?),
        InputFormat::Ndjson => Ok(TrackInput::parse_ndjson(&read_input(input)?)?),
        InputFormat::Gpx => {
            let data = read_input(input)?;
            read_gpx(BufReader::new(data.as_bytes()))
        }
    }
}

fn read_gpx<R: io::BufRead>(reader: R) -> Result<Vec<TrackPoint>, TrailpaceCliError> {
    let gpx = gpx::read(reader)?;

    let mut waypoints: Vec<&gpx::Waypoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .collect();

    if waypoints.is_empty() {
        waypoints = gpx
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .collect();
    }

    let missing = waypoints.iter().filter(|w| w.elevation.is_none()).count();
    if missing > 0 {
        tracing::warn!(missing, "GPX points without elevation, using 0 m");
    }

    Ok(waypoints
        .into_iter()
        .map(|w| {
            let point = w.point();
            TrackPoint::new(point.y(), point.x(), w.elevation.unwrap_or(0.0))
        })
        .collect())
}

fn format_output(report: &RouteReport, format: &OutputFormat) -> Result<String, TrailpaceCliError> {
    match format {
        OutputFormat::Ndjson => Ok(serde_json::to_string(report)? + "\n"),
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Trailpace track input",
        "type": "array",
        "items": {
            "type": "object",
            "required": ["lat", "lon", "ele"],
            "properties": {
                "lat": { "type": "number", "minimum": -90, "maximum": 90 },
                "lon": { "type": "number", "minimum": -180, "maximum": 180 },
                "ele": { "type": "number" }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "trailpace.report",
        "description": "Trailpace route report",
        "type": "object",
        "required": [
            "report_version", "producer", "computed_at_utc", "summary",
            "slope_breakdown", "smoothing_level", "elevation_profile",
            "estimates", "smart_estimate", "difficulty", "bio", "flags"
        ],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "computed_at_utc": { "type": "string", "format": "date-time" },
            "summary": { "type": "object" },
            "slope_breakdown": { "type": "array", "items": { "type": "object" } },
            "smoothing_level": { "type": "integer", "minimum": 0, "maximum": 4 },
            "elevation_profile": { "type": "array", "items": { "type": "object" } },
            "estimates": { "type": "array", "minItems": 5, "maxItems": 5 },
            "smart_estimate": { "type": "object" },
            "difficulty": { "type": "object" },
            "bio": {
                "type": "object",
                "properties": {
                    "calories": { "type": "integer" },
                    "water_liters": { "type": "number" }
                }
            },
            "safety": { "type": ["object", "null"] },
            "weather": { "type": ["object", "null"] },
            "flags": { "type": "array", "items": { "type": "string" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum TrailpaceCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Gpx(gpx::errors::GpxError),
    NoPoints,
    MissingStartDate,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for TrailpaceCliError {
    fn from(e: io::Error) -> Self {
        TrailpaceCliError::Io(e)
    }
}

impl From<ComputeError> for TrailpaceCliError {
    fn from(e: ComputeError) -> Self {
        TrailpaceCliError::Compute(e)
    }
}

impl From<serde_json::Error> for TrailpaceCliError {
    fn from(e: serde_json::Error) -> Self {
        TrailpaceCliError::Json(e)
    }
}

impl From<gpx::errors::GpxError> for TrailpaceCliError {
    fn from(e: gpx::errors::GpxError) -> Self {
        TrailpaceCliError::Gpx(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrailpaceCliError> for CliError {
    fn from(e: TrailpaceCliError) -> Self {
        match e {
            TrailpaceCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrailpaceCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'trailpace schema input' for the expected format".to_string()),
            },
            TrailpaceCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TrailpaceCliError::Gpx(e) => CliError {
                code: "GPX_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the file is valid GPX 1.0 or 1.1".to_string()),
            },
            TrailpaceCliError::NoPoints => CliError {
                code: "NO_POINTS".to_string(),
                message: "No track points found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TrailpaceCliError::MissingStartDate => CliError {
                code: "MISSING_START_DATE".to_string(),
                message: "--start-time requires a start date".to_string(),
                hint: Some("Pass --start-date or set planned_start in the request file".to_string()),
            },
            TrailpaceCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} points failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            TrailpaceCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_points: usize,
    valid_points: usize,
    invalid_points: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
