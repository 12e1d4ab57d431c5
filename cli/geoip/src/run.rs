//! Main execution logic for gf-geoip.

use anyhow::{Context, Result};
use gf_enrichment::{GeoIpEnricher, StatsSnapshot};
use gf_error::{classify_error, ErrorCategory, GfError};
use gf_types::EnrichmentConfig;
use std::future::Future;
use tokio::io::BufReader;
use tracing::info;

use crate::args::Cli;
use crate::host::{Host, HostStats};

/// Execute the enrichment filter with the provided arguments.
pub async fn execute(args: Cli) -> Result<(HostStats, StatsSnapshot)> {
    let config = EnrichmentConfig::load(&args.config)
        .map_err(GfError::from)
        .with_context(|| format!("Invalid configuration {}", args.config.display()))?;

    let enricher = GeoIpEnricher::from_config(config)
        .await
        .context("Failed to initialize GeoIP enrichment")?;

    let shutdown = shutdown_signal()?;

    info!(batch_size = args.batch_size, "Reading records from stdin");

    let host = Host::new(&enricher, args.batch_size);
    let host_stats = host
        .run(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            shutdown,
        )
        .await?;

    Ok((host_stats, enricher.stats()))
}

/// Exit status for a failed run.
///
/// Fatal startup errors (configuration or database) exit with 2; anything
/// else, such as a broken stdout pipe, exits with 1.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<GfError>().map(classify_error) {
        Some(ErrorCategory::Fatal) => 2,
        _ => 1,
    }
}

/// Installs the signal handlers and returns a future that resolves on the first signal.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sig_int =
        signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut sig_term =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    Ok(async move {
        tokio::select! {
            _ = sig_int.recv() => info!("SIGINT received"),
            _ = sig_term.recv() => info!("SIGTERM received"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await
            }
        }
    })
}
