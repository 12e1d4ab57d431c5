//! CLI argument definitions for gf-geoip.

use clap::Parser;
pub use gf_cli_common::LogLevel;
use std::path::PathBuf;

/// GeoIP enrichment filter for GeoFlow.
///
/// Reads newline-delimited JSON records from stdin, adds geolocation fields
/// for the IP addresses named in the configuration, and writes the records
/// to stdout in input order.
///
/// ## Examples
///
/// Enrich a log file:
///   gf-geoip --config /etc/geoflow/geoip.toml < access.ndjson
///
/// Debug lookups:
///   tail -f access.ndjson | gf-geoip --config geoip.toml -l debug
#[derive(Parser, Debug)]
#[command(name = "gf-geoip")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "GF_GEOIP_CONFIG")]
    pub config: PathBuf,

    /// Number of records enriched and written together (must be >= 1)
    #[arg(long, default_value = "1", value_parser = parse_positive_usize)]
    pub batch_size: usize,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
