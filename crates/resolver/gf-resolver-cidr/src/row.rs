//! RangeRow - one row of range data, convertible to lookup attributes.

use crate::columns;
use gf_types::GeoAttributes;
use ip_network::IpNetwork;
use std::sync::Arc;

/// A row of range data.
///
/// Stores column values indexed by position, with shared column names.
#[derive(Debug, Clone)]
pub struct RangeRow {
    /// Column values indexed by position.
    values: Vec<String>,

    /// Reference to column names (shared across all rows in table).
    columns: Arc<Vec<String>>,
}

impl RangeRow {
    /// Creates a new row.
    pub fn new(values: Vec<String>, columns: Arc<Vec<String>>) -> Self {
        Self { values, columns }
    }

    /// Gets a value by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
            .map(|s| s.as_str())
    }

    /// Gets a trimmed, non-empty value by column name.
    fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Converts to lookup attributes, reporting `network` as the matched prefix.
    ///
    /// Empty cells and numbers that fail to parse are left unset.
    pub fn to_attributes(&self, network: IpNetwork) -> GeoAttributes {
        GeoAttributes {
            country_code: self.non_empty(columns::COUNTRY_CODE).map(String::from),
            city: self.non_empty(columns::CITY).map(String::from),
            latitude: self
                .non_empty(columns::LATITUDE)
                .and_then(|s| s.parse().ok()),
            longitude: self
                .non_empty(columns::LONGITUDE)
                .and_then(|s| s.parse().ok()),
            as_number: self
                .non_empty(columns::AS_NUMBER)
                .map(|s| s.trim_start_matches("AS"))
                .and_then(|s| s.parse().ok()),
            as_organization: self.non_empty(columns::AS_ORGANIZATION).map(String::from),
            network: Some(network),
        }
    }
}
