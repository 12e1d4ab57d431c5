//! GeoIpEnricher - applies lookup rules to record batches.

use crate::{open_resolver, EnrichmentStats, StatsSnapshot};
use gf_error::{ConfigError, Result};
use gf_traits::{Resolver, Transform};
use gf_types::{EnrichmentConfig, LookupRule, Record};
use serde_json::Value;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, info, trace};

/// Enriches records with geolocation attributes.
///
/// Holds the immutable configuration and a shared resolver handle. Applying
/// a batch never fails: a missing source field, an unparseable address or an
/// address without an entry leaves the rule's destinations unwritten, and a
/// backend error is logged before moving on.
///
/// # Rule evaluation
///
/// For every record, rules run in configuration order and independently of
/// each other. Only attributes that are named in the rule, provided by the
/// configured database type, and present in the lookup result are written.
pub struct GeoIpEnricher {
    config: EnrichmentConfig,
    resolver: Arc<dyn Resolver>,
    stats: EnrichmentStats,
}

impl std::fmt::Debug for GeoIpEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpEnricher")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl GeoIpEnricher {
    /// Creates an enricher over an already opened resolver.
    ///
    /// The resolver must serve the configured database type.
    pub fn new(config: EnrichmentConfig, resolver: Arc<dyn Resolver>) -> Result<Self> {
        if resolver.database_type() != config.database_type {
            return Err(ConfigError::DatabaseTypeMismatch {
                configured: config.database_type.to_string(),
                actual: resolver.database_type().to_string(),
            }
            .into());
        }

        info!(
            database_type = %config.database_type,
            resolver = resolver.name(),
            rules = config.rules.len(),
            "GeoIP enricher initialized"
        );

        Ok(Self {
            config,
            resolver,
            stats: EnrichmentStats::new(),
        })
    }

    /// Opens the configured database and creates an enricher over it.
    pub async fn from_config(config: EnrichmentConfig) -> Result<Self> {
        let resolver = open_resolver(&config.database_path, config.database_type).await?;
        Self::new(config, resolver)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Returns a snapshot of the lookup counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Applies every rule to a single record.
    pub fn enrich(&self, record: &mut Record) {
        for rule in &self.config.rules {
            self.apply_rule(record, rule);
        }
        self.stats.record_record();
    }

    fn apply_rule(&self, record: &mut Record, rule: &LookupRule) {
        if rule.is_inert() {
            return;
        }

        let ip = match record.get_field(&rule.source_field) {
            Some(value) => parse_ip(value),
            None => {
                self.stats.record_missing_field();
                return;
            }
        };

        // Unparseable addresses are treated like addresses with no entry
        let Some(ip) = ip else {
            trace!(field = %rule.source_field, "Source field is not an IP address");
            self.stats.record_invalid_address();
            return;
        };

        let attributes = match self.resolver.lookup(ip) {
            Ok(Some(attributes)) => attributes,
            Ok(None) => {
                self.stats.record_miss();
                return;
            }
            Err(e) => {
                error!(
                    field = %rule.source_field,
                    ip = %ip,
                    error = %e,
                    "GeoIP lookup failed"
                );
                self.stats.record_error();
                return;
            }
        };

        let database_type = self.config.database_type;
        let mut written = 0;

        for (attribute, dest) in rule.destinations() {
            if !database_type.provides(attribute) {
                continue;
            }
            if let Some(value) = attributes.value(attribute) {
                record.add_field(dest, value);
                written += 1;
            }
        }

        self.stats.record_hit(written);
    }
}

impl Transform for GeoIpEnricher {
    fn apply(&self, mut batch: Vec<Record>) -> Vec<Record> {
        for record in batch.iter_mut() {
            self.enrich(record);
        }
        batch
    }

    fn name(&self) -> &str {
        "geoip"
    }
}

/// Parses a field value as a textual IP address.
fn parse_ip(value: &Value) -> Option<IpAddr> {
    value.as_str()?.trim().parse().ok()
}
