//! CSV loading for range tables.

use crate::CidrTable;
use gf_error::ResolverError;
use gf_types::{DatabaseType, GeoAttribute};
use std::path::Path;
use tracing::{debug, info};

/// Column names understood in range CSV files.
pub mod columns {
    use gf_types::GeoAttribute;

    /// Required key column holding the CIDR or bare address.
    pub const NETWORK: &str = "network";
    pub const COUNTRY_CODE: &str = "country_code";
    pub const CITY: &str = "city";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const AS_NUMBER: &str = "as_number";
    pub const AS_ORGANIZATION: &str = "as_organization";

    /// Column holding an attribute. The network attribute comes from the
    /// matched prefix, so it maps to the key column.
    pub fn for_attribute(attribute: GeoAttribute) -> &'static str {
        match attribute {
            GeoAttribute::CountryCode => COUNTRY_CODE,
            GeoAttribute::City => CITY,
            GeoAttribute::Latitude => LATITUDE,
            GeoAttribute::Longitude => LONGITUDE,
            GeoAttribute::AsNumber => AS_NUMBER,
            GeoAttribute::AsOrganization => AS_ORGANIZATION,
            GeoAttribute::Network => NETWORK,
        }
    }
}

/// Loads a CidrTable from a local CSV file.
///
/// Fails when the file is missing or unreadable, has no `network` column, or
/// has none of the attribute columns `database_type` needs.
pub async fn load_cidr_table(
    path: impl AsRef<Path>,
    database_type: DatabaseType,
) -> Result<CidrTable, ResolverError> {
    let path = path.as_ref();
    let content = load_from_file(path).await?;
    let (headers, records) = parse_csv(&content)?;

    let key_idx = headers
        .iter()
        .position(|h| h == columns::NETWORK)
        .ok_or_else(|| {
            ResolverError::InvalidFormat(format!(
                "Key column '{}' not found in CSV headers of {}: {:?}",
                columns::NETWORK,
                path.display(),
                headers
            ))
        })?;

    check_attribute_columns(path, &headers, database_type)?;

    let mut table = CidrTable::new(headers);
    let mut errors = 0;

    for (line_num, record) in records.iter().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!(
                    line = e.position().map(|p| p.line()),
                    error = %e,
                    "Skipping unreadable CSV row"
                );
                errors += 1;
                continue;
            }
        };
        let cidr = record.get(key_idx).unwrap_or("");
        let values: Vec<String> = record.iter().map(|s| s.to_string()).collect();

        if let Err(e) = table.insert(cidr, values) {
            debug!(
                line = line_num + 2, // +2 for 1-indexed and header row
                cidr = %cidr,
                error = %e,
                "Skipping invalid CIDR entry"
            );
            errors += 1;
        }
    }

    info!(
        path = %path.display(),
        database_type = %database_type,
        entries = table.len(),
        ipv4_entries = table.ipv4_count(),
        ipv6_entries = table.ipv6_count(),
        errors = errors,
        "Loaded CidrTable"
    );

    Ok(table)
}

/// A file that can serve none of the type's attributes is the wrong file.
fn check_attribute_columns(
    path: &Path,
    headers: &[String],
    database_type: DatabaseType,
) -> Result<(), ResolverError> {
    let served = database_type
        .attributes()
        .iter()
        .filter(|a| **a != GeoAttribute::Network)
        .any(|a| headers.iter().any(|h| h == columns::for_attribute(*a)));

    // The network attribute alone is enough for an asn table
    if served || database_type.provides(GeoAttribute::Network) {
        return Ok(());
    }

    Err(ResolverError::IncompatibleDatabase {
        path: path.display().to_string(),
        expected: database_type.to_string(),
        found: format!("CSV with columns {headers:?}"),
    })
}

async fn load_from_file(path: &Path) -> Result<Vec<u8>, ResolverError> {
    if !path.exists() {
        return Err(ResolverError::NotFound(path.display().to_string()));
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| ResolverError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Rows that fail to decode are kept as errors so the caller can count them.
type CsvRows = Vec<Result<csv::StringRecord, csv::Error>>;

fn parse_csv(content: &[u8]) -> Result<(Vec<String>, CsvRows), ResolverError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ResolverError::InvalidFormat(format!("Failed to parse CSV headers: {e}")))?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let records: CsvRows = reader.records().collect();

    Ok((headers, records))
}
