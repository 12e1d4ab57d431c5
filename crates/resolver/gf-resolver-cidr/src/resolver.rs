//! Resolver over a loaded range table.

use crate::{load_cidr_table, CidrTable};
use gf_error::{LookupError, ResolverError};
use gf_traits::Resolver;
use gf_types::{DatabaseType, GeoAttributes};
use std::net::IpAddr;
use std::path::Path;

/// Resolves addresses against an in-memory [`CidrTable`].
///
/// The table is built once and only read afterwards, so lookups never fail:
/// an address is either covered by a range or not found.
#[derive(Debug)]
pub struct CidrResolver {
    table: CidrTable,
    database_type: DatabaseType,
}

impl CidrResolver {
    /// Loads a range CSV and wraps it as a resolver.
    pub async fn open(
        path: impl AsRef<Path>,
        database_type: DatabaseType,
    ) -> Result<Self, ResolverError> {
        let table = load_cidr_table(path, database_type).await?;
        Ok(Self::new(table, database_type))
    }

    /// Wraps an already built table.
    pub fn new(table: CidrTable, database_type: DatabaseType) -> Self {
        Self {
            table,
            database_type,
        }
    }
}

impl Resolver for CidrResolver {
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoAttributes>, LookupError> {
        Ok(self
            .table
            .lookup_addr(ip)
            .map(|(network, row)| row.to_attributes(network)))
    }

    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn name(&self) -> &str {
        "cidr"
    }
}
