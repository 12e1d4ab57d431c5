//! GeoIP enrichment for GeoFlow.
//!
//! This crate provides the enrichment step the host runs on every batch:
//! - [`GeoIpEnricher`] - applies lookup rules to records via a [`Resolver`]
//! - [`open_resolver`] - opens the backend matching the configured database
//! - [`EnrichmentStats`] - lookup counters
//!
//! # Example
//!
//! ```rust,ignore
//! use gf_enrichment::GeoIpEnricher;
//! use gf_types::EnrichmentConfig;
//!
//! let config = EnrichmentConfig::load("/etc/geoflow/geoip.toml")?;
//! let enricher = GeoIpEnricher::from_config(config).await?;
//!
//! let batch = enricher.apply(records);
//! ```
//!
//! [`Resolver`]: gf_traits::Resolver

mod backend;
mod enricher;
mod stats;

pub use backend::{open_resolver, BackendKind};
pub use enricher::GeoIpEnricher;
pub use stats::{EnrichmentStats, StatsSnapshot};
