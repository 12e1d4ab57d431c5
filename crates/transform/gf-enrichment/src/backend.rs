//! Backend selection for the configured database.

use gf_error::ResolverError;
use gf_resolver_cidr::CidrResolver;
use gf_resolver_mmdb::MmdbResolver;
use gf_traits::Resolver;
use gf_types::DatabaseType;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Which resolver implementation serves a database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// MaxMind DB file (`.mmdb` and anything that is not CSV).
    Mmdb,
    /// CSV of network ranges.
    Cidr,
}

impl BackendKind {
    /// Picks the backend from the file extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Cidr,
            _ => Self::Mmdb,
        }
    }
}

/// Opens the resolver for a database.
///
/// This is the only place a database file is opened; the returned handle is
/// shared read-only for the life of the process.
pub async fn open_resolver(
    path: impl AsRef<Path>,
    database_type: DatabaseType,
) -> Result<Arc<dyn Resolver>, ResolverError> {
    let path = path.as_ref();
    let kind = BackendKind::for_path(path);

    let resolver: Arc<dyn Resolver> = match kind {
        BackendKind::Mmdb => Arc::new(MmdbResolver::open(path, database_type)?),
        BackendKind::Cidr => Arc::new(CidrResolver::open(path, database_type).await?),
    };

    info!(
        path = %path.display(),
        backend = resolver.name(),
        database_type = %database_type,
        "Opened GeoIP resolver"
    );

    Ok(resolver)
}
