//! Resolver trait for geolocation lookups.

use gf_error::LookupError;
use gf_types::{DatabaseType, GeoAttributes};
use std::net::IpAddr;

/// An opened geolocation database.
///
/// Implementations are opened once at startup and then shared read-only, so
/// `lookup` must not depend on per-call mutable state.
///
/// # Outcomes
///
/// - `Ok(Some(attrs))` - the address has an entry
/// - `Ok(None)` - the address has no entry; this is the normal "not found" case
/// - `Err(_)` - the backend failed; callers log and move on
pub trait Resolver: Send + Sync + std::fmt::Debug {
    /// Looks up an address.
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoAttributes>, LookupError>;

    /// The database type this resolver was opened for.
    fn database_type(&self) -> DatabaseType;

    /// Returns the name of this resolver for logging.
    fn name(&self) -> &str {
        "resolver"
    }
}
