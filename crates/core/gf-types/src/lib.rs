//! Core types for GeoFlow.
//!
//! This crate provides the data model shared by resolvers, the enrichment
//! engine and the host binary:
//! - [`Record`] - a mutable field container delivered by the host
//! - [`DatabaseType`], [`GeoAttribute`], [`GeoAttributes`] - what a lookup yields
//! - [`EnrichmentConfig`], [`LookupRule`] - validated plugin configuration

mod config;
mod geo;
mod record;

pub use config::{EnrichmentConfig, LookupRule, DEFAULT_DATABASE_PATH};
pub use geo::{DatabaseType, GeoAttribute, GeoAttributes};
pub use record::Record;
