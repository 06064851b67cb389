//! FFI bindings for Trailpace
//!
//! This module provides C-compatible functions for calling Trailpace from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `trailpace_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::pipeline::{analyze_json, RoutePlanner};
use crate::profile::HikerProfile;
use crate::schema::TrackInput;
use crate::types::{AnalysisRequest, PlannedStart, SmoothingLevel};
use crate::weather::WeatherSnapshot;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Like `cstr_to_string`, but NULL reads as an empty string
unsafe fn cstr_or_empty(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return Some(String::new());
    }
    cstr_to_string(ptr)
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Map a planner result to a status code, recording the error
fn status<T>(result: Result<T, ComputeError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze a track and return the report JSON.
///
/// # Safety
/// - `track_json` must be a valid null-terminated C string.
/// - `request_json` and `weather_json` must be valid null-terminated C strings
///   or NULL (NULL or empty means defaults / no weather).
/// - Returns a newly allocated string that must be freed with `trailpace_free_string`.
/// - Returns NULL on error; call `trailpace_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trailpace_analyze(
    track_json: *const c_char,
    request_json: *const c_char,
    weather_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let track_str = match cstr_to_string(track_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid track string pointer");
            return ptr::null_mut();
        }
    };

    let request_str = match cstr_or_empty(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    let weather_str = match cstr_or_empty(weather_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid weather string pointer");
            return ptr::null_mut();
        }
    };

    match analyze_json(&track_str, &request_str, &weather_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful API (Planner)
// ============================================================================

/// Opaque handle to a route planner
pub struct TrailpacePlannerHandle {
    planner: RoutePlanner,
}

/// Create a new planner for a track.
///
/// # Safety
/// - `track_json` must be a valid null-terminated C string.
/// - `request_json` must be a valid null-terminated C string or NULL for defaults.
/// - Returns a pointer that must be freed with `trailpace_planner_free`.
/// - Returns NULL on error; call `trailpace_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_new(
    track_json: *const c_char,
    request_json: *const c_char,
) -> *mut TrailpacePlannerHandle {
    clear_last_error();

    let track_str = match cstr_to_string(track_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid track string pointer");
            return ptr::null_mut();
        }
    };

    let request_str = match cstr_or_empty(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    let built = TrackInput::parse_array(&track_str).and_then(|track| {
        let request = if request_str.trim().is_empty() {
            AnalysisRequest::default()
        } else {
            serde_json::from_str(&request_str)?
        };
        RoutePlanner::new(track, request)
    });

    match built {
        Ok(planner) => Box::into_raw(Box::new(TrailpacePlannerHandle { planner })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a planner.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_free(planner: *mut TrailpacePlannerHandle) {
    if !planner.is_null() {
        drop(Box::from_raw(planner));
    }
}

/// Replace the planner's track.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - `track_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_set_track(
    planner: *mut TrailpacePlannerHandle,
    track_json: *const c_char,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return -1;
    }

    let handle = &mut *planner;

    let track_str = match cstr_to_string(track_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid track string pointer");
            return -1;
        }
    };

    status(
        TrackInput::parse_array(&track_str)
            .and_then(|track| handle.planner.set_track(track).map(|_| ())),
    )
}

/// Replace the hiker profile (JSON `HikerProfile`).
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - `profile_json` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_set_profile(
    planner: *mut TrailpacePlannerHandle,
    profile_json: *const c_char,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return -1;
    }

    let handle = &mut *planner;

    let profile_str = match cstr_to_string(profile_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid profile string pointer");
            return -1;
        }
    };

    status(
        serde_json::from_str::<HikerProfile>(&profile_str)
            .map_err(ComputeError::from)
            .and_then(|profile| handle.planner.set_profile(profile).map(|_| ())),
    )
}

/// Change the smoothing level (0-4).
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_set_smoothing(
    planner: *mut TrailpacePlannerHandle,
    level: u8,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return -1;
    }

    let handle = &mut *planner;

    status(
        SmoothingLevel::try_from(level)
            .and_then(|level| handle.planner.set_smoothing(level).map(|_| ())),
    )
}

/// Set or clear the planned start (JSON `{"date": "YYYY-MM-DD", "time": "HH:MM:SS"}`).
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - `start_json` must be a valid null-terminated C string, or NULL / empty to clear.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_set_planned_start(
    planner: *mut TrailpacePlannerHandle,
    start_json: *const c_char,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return -1;
    }

    let handle = &mut *planner;

    let start_str = match cstr_or_empty(start_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid start string pointer");
            return -1;
        }
    };

    let start = if start_str.trim().is_empty() {
        Ok(None)
    } else {
        serde_json::from_str::<PlannedStart>(&start_str)
            .map(Some)
            .map_err(ComputeError::from)
    };

    status(start.and_then(|start| handle.planner.set_planned_start(start).map(|_| ())))
}

/// Deliver the host's forecast for the planned start (JSON `WeatherSnapshot`).
///
/// NULL or an empty string reports a failed fetch, which clears the weather.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - `weather_json` must be a valid null-terminated C string or NULL.
/// - Returns 0 when applied, 1 when the planner has no planned start or the
///   fetch failed, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_set_weather(
    planner: *mut TrailpacePlannerHandle,
    weather_json: *const c_char,
) -> i32 {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return -1;
    }

    let handle = &mut *planner;

    let weather_str = match cstr_or_empty(weather_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid weather string pointer");
            return -1;
        }
    };

    let Some(ticket) = handle.planner.begin_weather_request() else {
        return 1;
    };

    let weather = if weather_str.trim().is_empty() {
        Err(ComputeError::WeatherUnavailable(
            "host reported no forecast".to_string(),
        ))
    } else {
        match serde_json::from_str::<WeatherSnapshot>(&weather_str) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                set_last_error(&e.to_string());
                return -1;
            }
        }
    };

    match handle.planner.complete_weather_request(&ticket, weather) {
        Ok(crate::weather::ForecastOutcome::Applied) => 0,
        Ok(_) => 1,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Current report JSON for the planner.
///
/// # Safety
/// - `planner` must be a valid pointer returned by `trailpace_planner_new`.
/// - Returns a newly allocated string that must be freed with `trailpace_free_string`.
/// - Returns NULL on error; call `trailpace_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn trailpace_planner_report(
    planner: *const TrailpacePlannerHandle,
) -> *mut c_char {
    clear_last_error();

    if planner.is_null() {
        set_last_error("Null planner pointer");
        return ptr::null_mut();
    }

    let handle = &*planner;

    match handle.planner.report_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Trailpace functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Trailpace function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn trailpace_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Trailpace function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn trailpace_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Trailpace library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn trailpace_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
