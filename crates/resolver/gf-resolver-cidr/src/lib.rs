//! CSV CIDR-range backend for GeoFlow.
//!
//! Serves geolocation lookups from a CSV file of network ranges, for
//! deployments that maintain their own range data instead of a MaxMind
//! database:
//! - [`CidrTable`] - O(log n) longest-prefix match for IPv4 and IPv6
//! - [`CidrResolver`] - [`gf_traits::Resolver`] over a loaded table
//!
//! # File format
//!
//! ```text
//! network,country_code,city,latitude,longitude,as_number,as_organization
//! 8.8.8.0/24,US,Mountain View,37.386,-122.0838,15169,GOOGLE
//! 1.1.1.1,AU,Sydney,,,13335,CLOUDFLARENET
//! ```
//!
//! Only the `network` column is required; attribute columns may be omitted or
//! left empty.
//!
//! # Example
//!
//! ```rust,ignore
//! use gf_resolver_cidr::CidrResolver;
//! use gf_types::DatabaseType;
//!
//! let resolver = CidrResolver::open("/etc/geoflow/ranges.csv", DatabaseType::City).await?;
//! ```

mod cidr_table;
mod loader;
mod resolver;
mod row;

pub use cidr_table::CidrTable;
pub use loader::{columns, load_cidr_table};
pub use resolver::CidrResolver;
pub use row::RangeRow;
