//! Lookup counters for the enrichment step.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated while enriching.
///
/// Atomic so an enricher shared across threads can count without locking.
/// Counters are informational only and never change enrichment behavior.
#[derive(Debug, Default)]
pub struct EnrichmentStats {
    /// Records passed through the enricher
    records: AtomicU64,

    /// Rules skipped because the record lacked the source field
    missing_field: AtomicU64,

    /// Source values that were not a textual IP address
    invalid_address: AtomicU64,

    /// Lookups sent to the resolver
    lookups: AtomicU64,

    /// Lookups that found an entry
    hits: AtomicU64,

    /// Lookups with no entry for the address
    misses: AtomicU64,

    /// Lookups that failed in the backend
    errors: AtomicU64,

    /// Destination fields written
    fields_written: AtomicU64,
}

impl EnrichmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_record(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missing_field(&self) {
        self.missing_field.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_address(&self) {
        self.invalid_address.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self, fields_written: u64) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.fields_written.fetch_add(fields_written, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            missing_field: self.missing_field.load(Ordering::Relaxed),
            invalid_address: self.invalid_address.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            fields_written: self.fields_written.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EnrichmentStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub records: u64,
    pub missing_field: u64,
    pub invalid_address: u64,
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub fields_written: u64,
}

impl StatsSnapshot {
    /// Fraction of lookups that found an entry, or 0.0 if none were made.
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}
