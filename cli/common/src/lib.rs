//! Shared utilities for GeoFlow CLI binaries.
//!
//! Log level selection and subscriber setup used by `gf-geoip`.

pub mod args;
pub mod logging;

pub use args::LogLevel;
pub use logging::init_logging;
