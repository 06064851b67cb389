//! Track input schema
//!
//! This module defines how a shell hands raw track points to the engine and
//! how it checks them before analysis.

mod track_input;

pub use track_input::*;
