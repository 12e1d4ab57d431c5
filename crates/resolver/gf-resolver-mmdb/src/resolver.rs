//! MmdbResolver - city, country and ASN lookups against a MaxMind database.

use crate::is_compatible;
use gf_error::{LookupError, ResolverError};
use gf_traits::Resolver;
use gf_types::{DatabaseType, GeoAttributes};
use ip_network::IpNetwork;
use maxminddb::{geoip2, MaxMindDBError, Reader};
use std::net::IpAddr;
use std::path::Path;
use tracing::info;

/// Locale used for place names.
const NAME_LOCALE: &str = "en";

type LookupFn = fn(&Reader<Vec<u8>>, IpAddr) -> Result<Option<GeoAttributes>, MaxMindDBError>;

/// Geolocation lookups against an in-memory MaxMind database.
///
/// The database is read fully into memory on open. Lookups only read from it,
/// so one resolver can be shared across threads.
pub struct MmdbResolver {
    reader: Reader<Vec<u8>>,
    database_type: DatabaseType,
    lookup_fn: LookupFn,
}

impl std::fmt::Debug for MmdbResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmdbResolver")
            .field("database_type", &self.database_type)
            .field("metadata_type", &self.reader.metadata.database_type)
            .field("ip_version", &self.reader.metadata.ip_version)
            .finish_non_exhaustive()
    }
}

impl MmdbResolver {
    /// Opens a database file for lookups of the given type.
    ///
    /// Fails when the file is missing or unreadable, is not a MaxMind
    /// database, or is a database that cannot serve `database_type`.
    pub fn open(
        path: impl AsRef<Path>,
        database_type: DatabaseType,
    ) -> Result<Self, ResolverError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ResolverError::NotFound(path.display().to_string()));
        }

        let reader = Reader::open_readfile(path).map_err(|e| open_error(path, e))?;
        let resolver = Self::from_reader(path, reader, database_type)?;

        info!(
            path = %path.display(),
            database_type = %database_type,
            metadata_type = %resolver.reader.metadata.database_type,
            node_count = resolver.reader.metadata.node_count,
            build_epoch = resolver.reader.metadata.build_epoch,
            "Opened MaxMind database"
        );

        Ok(resolver)
    }

    /// Opens a database from bytes already in memory.
    pub fn from_bytes(bytes: Vec<u8>, database_type: DatabaseType) -> Result<Self, ResolverError> {
        let label = Path::new("<memory>");
        let reader = Reader::from_source(bytes).map_err(|e| open_error(label, e))?;
        Self::from_reader(label, reader, database_type)
    }

    fn from_reader(
        path: &Path,
        reader: Reader<Vec<u8>>,
        database_type: DatabaseType,
    ) -> Result<Self, ResolverError> {
        if !is_compatible(database_type, &reader.metadata.database_type) {
            return Err(ResolverError::IncompatibleDatabase {
                path: path.display().to_string(),
                expected: database_type.to_string(),
                found: reader.metadata.database_type.clone(),
            });
        }

        let lookup_fn: LookupFn = match database_type {
            DatabaseType::City => lookup_city,
            DatabaseType::Country => lookup_country,
            DatabaseType::Asn => lookup_asn,
        };

        Ok(Self {
            reader,
            database_type,
            lookup_fn,
        })
    }

    /// The database type string from the file's metadata.
    pub fn metadata_type(&self) -> &str {
        &self.reader.metadata.database_type
    }
}

impl Resolver for MmdbResolver {
    fn lookup(&self, ip: IpAddr) -> Result<Option<GeoAttributes>, LookupError> {
        // An IPv4-only database holds no IPv6 entries
        if ip.is_ipv6() && self.reader.metadata.ip_version == 4 {
            return Ok(None);
        }

        (self.lookup_fn)(&self.reader, ip).map_err(lookup_error)
    }

    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn name(&self) -> &str {
        "mmdb"
    }
}

fn lookup_city(
    reader: &Reader<Vec<u8>>,
    ip: IpAddr,
) -> Result<Option<GeoAttributes>, MaxMindDBError> {
    let Some((record, prefix_len)) = found(reader.lookup_prefix::<geoip2::City>(ip))? else {
        return Ok(None);
    };

    let location = record.location.as_ref();

    Ok(Some(GeoAttributes {
        country_code: record
            .country
            .and_then(|c| c.iso_code)
            .map(String::from),
        city: record
            .city
            .and_then(|c| c.names)
            .and_then(|names| names.get(NAME_LOCALE).map(|n| n.to_string())),
        latitude: location.and_then(|l| l.latitude),
        longitude: location.and_then(|l| l.longitude),
        network: network(ip, prefix_len),
        ..Default::default()
    }))
}

fn lookup_country(
    reader: &Reader<Vec<u8>>,
    ip: IpAddr,
) -> Result<Option<GeoAttributes>, MaxMindDBError> {
    let Some((record, prefix_len)) = found(reader.lookup_prefix::<geoip2::Country>(ip))? else {
        return Ok(None);
    };

    Ok(Some(GeoAttributes {
        country_code: record
            .country
            .and_then(|c| c.iso_code)
            .map(String::from),
        network: network(ip, prefix_len),
        ..Default::default()
    }))
}

fn lookup_asn(
    reader: &Reader<Vec<u8>>,
    ip: IpAddr,
) -> Result<Option<GeoAttributes>, MaxMindDBError> {
    let Some((record, prefix_len)) = found(reader.lookup_prefix::<geoip2::Asn>(ip))? else {
        return Ok(None);
    };

    Ok(Some(GeoAttributes {
        as_number: record.autonomous_system_number,
        as_organization: record.autonomous_system_organization.map(String::from),
        network: network(ip, prefix_len),
        ..Default::default()
    }))
}

/// Turns the reader's not-found error into `None`.
fn found<T>(result: Result<T, MaxMindDBError>) -> Result<Option<T>, MaxMindDBError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Builds the matched network from the looked-up address and prefix length.
///
/// IPv4 lookups in an IPv6 tree may report the prefix relative to the
/// 128-bit mapped address.
fn network(ip: IpAddr, prefix_len: usize) -> Option<IpNetwork> {
    let prefix_len = match ip {
        IpAddr::V4(_) if prefix_len > 32 => prefix_len.checked_sub(96)?,
        _ => prefix_len,
    };
    let prefix_len = u8::try_from(prefix_len).ok()?;
    IpNetwork::new_truncate(ip, prefix_len).ok()
}

fn open_error(path: &Path, error: MaxMindDBError) -> ResolverError {
    match error {
        MaxMindDBError::IoError(reason) | MaxMindDBError::MapError(reason) => {
            ResolverError::Open {
                path: path.display().to_string(),
                reason,
            }
        }
        other => ResolverError::InvalidFormat(format!("{}: {}", path.display(), other)),
    }
}

fn lookup_error(error: MaxMindDBError) -> LookupError {
    match error {
        MaxMindDBError::DecodingError(msg) => LookupError::Decoding(msg),
        MaxMindDBError::IoError(msg) | MaxMindDBError::MapError(msg) => LookupError::Io(msg),
        other => LookupError::Database(other.to_string()),
    }
}
