//! MaxMind DB backend for GeoFlow.
//!
//! [`MmdbResolver`] serves city, country and ASN lookups from a `.mmdb` file
//! (GeoIP2, GeoLite2 and compatible databases). The lookup variant is picked
//! once when the database is opened, after checking that the database's own
//! type can serve it.

mod compat;
mod resolver;

#[cfg(test)]
mod fixture;

pub use compat::is_compatible;
pub use resolver::MmdbResolver;
