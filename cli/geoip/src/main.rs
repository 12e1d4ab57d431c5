//! gf-geoip CLI
//!
//! GeoIP enrichment filter for newline-delimited JSON records.

use clap::Parser;
use tracing::{error, info};

mod args;
mod host;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, stdout carries records
    gf_cli_common::init_logging(args.log_level)?;

    let (host_stats, stats) = match run::execute(args).await {
        Ok(result) => result,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "gf-geoip failed");
            std::process::exit(run::exit_code(&e));
        }
    };

    info!(
        lines_read = host_stats.lines_read,
        invalid_lines = host_stats.invalid_lines,
        records_written = host_stats.records_written,
        batches = host_stats.batches,
        "Input finished"
    );
    info!(
        records = stats.records,
        lookups = stats.lookups,
        hits = stats.hits,
        misses = stats.misses,
        errors = stats.errors,
        missing_field = stats.missing_field,
        invalid_address = stats.invalid_address,
        fields_written = stats.fields_written,
        hit_rate = stats.hit_rate(),
        "GeoIP enrichment summary"
    );

    Ok(())
}
