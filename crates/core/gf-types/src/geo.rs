//! Geolocation database types and lookup results.

use gf_error::ConfigError;
use ip_network::IpNetwork;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Category of geolocation database, which decides the attributes a lookup yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// City-level database: country code, city name, coordinates.
    #[default]
    City,
    /// Country-level database: country code only.
    Country,
    /// Autonomous-system database: AS number, AS organization, network.
    Asn,
}

impl DatabaseType {
    /// Returns the configuration name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Country => "country",
            Self::Asn => "asn",
        }
    }

    /// Attributes this database type can populate.
    pub fn attributes(&self) -> &'static [GeoAttribute] {
        match self {
            Self::City => &[
                GeoAttribute::CountryCode,
                GeoAttribute::City,
                GeoAttribute::Latitude,
                GeoAttribute::Longitude,
            ],
            Self::Country => &[GeoAttribute::CountryCode],
            Self::Asn => &[
                GeoAttribute::AsNumber,
                GeoAttribute::AsOrganization,
                GeoAttribute::Network,
            ],
        }
    }

    /// Returns true if lookups of this type can populate `attribute`.
    pub fn provides(&self, attribute: GeoAttribute) -> bool {
        self.attributes().contains(&attribute)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseType {
    type Err = ConfigError;

    /// Parses a `db_type` setting. An empty value selects [`DatabaseType::City`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        match s.to_ascii_lowercase().as_str() {
            "city" => Ok(Self::City),
            "country" => Ok(Self::Country),
            "asn" => Ok(Self::Asn),
            _ => Err(ConfigError::UnknownDatabaseType(s.to_string())),
        }
    }
}

/// A single attribute of a geolocation lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoAttribute {
    CountryCode,
    City,
    Latitude,
    Longitude,
    AsNumber,
    AsOrganization,
    Network,
}

impl GeoAttribute {
    /// All attributes, in the order destinations are written.
    pub const ALL: [GeoAttribute; 7] = [
        GeoAttribute::CountryCode,
        GeoAttribute::City,
        GeoAttribute::Latitude,
        GeoAttribute::Longitude,
        GeoAttribute::AsNumber,
        GeoAttribute::AsOrganization,
        GeoAttribute::Network,
    ];
}

/// Result of a successful lookup.
///
/// Only the attributes the database carries for an address are populated; a
/// country database fills `country_code` and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoAttributes {
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
    /// City name, English locale.
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Autonomous system number.
    pub as_number: Option<u32>,
    /// Autonomous system organization name.
    pub as_organization: Option<String>,
    /// Network prefix the address was matched in.
    pub network: Option<IpNetwork>,
}

impl GeoAttributes {
    /// Returns the typed field value for an attribute, if present.
    pub fn value(&self, attribute: GeoAttribute) -> Option<Value> {
        match attribute {
            GeoAttribute::CountryCode => self.country_code.clone().map(Value::String),
            GeoAttribute::City => self.city.clone().map(Value::String),
            GeoAttribute::Latitude => self.latitude.and_then(Number::from_f64).map(Value::Number),
            GeoAttribute::Longitude => self.longitude.and_then(Number::from_f64).map(Value::Number),
            GeoAttribute::AsNumber => self.as_number.map(Value::from),
            GeoAttribute::AsOrganization => self.as_organization.clone().map(Value::String),
            GeoAttribute::Network => self.network.map(|n| Value::String(n.to_string())),
        }
    }

    /// Returns true if no attribute is populated.
    pub fn is_empty(&self) -> bool {
        GeoAttribute::ALL.iter().all(|a| self.value(*a).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_database_type_parse() {
        assert_eq!("city".parse::<DatabaseType>().unwrap(), DatabaseType::City);
        assert_eq!("Country".parse::<DatabaseType>().unwrap(), DatabaseType::Country);
        assert_eq!(" asn ".parse::<DatabaseType>().unwrap(), DatabaseType::Asn);
    }

    #[test]
    fn test_database_type_empty_defaults_to_city() {
        assert_eq!("".parse::<DatabaseType>().unwrap(), DatabaseType::City);
        assert_eq!(DatabaseType::default(), DatabaseType::City);
    }

    #[test]
    fn test_database_type_unknown() {
        let err = "isp".parse::<DatabaseType>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatabaseType(ref t) if t == "isp"));
    }

    #[test]
    fn test_database_type_attributes() {
        assert!(DatabaseType::City.provides(GeoAttribute::Latitude));
        assert!(!DatabaseType::City.provides(GeoAttribute::AsNumber));

        assert_eq!(DatabaseType::Country.attributes(), &[GeoAttribute::CountryCode]);

        assert!(DatabaseType::Asn.provides(GeoAttribute::Network));
        assert!(!DatabaseType::Asn.provides(GeoAttribute::CountryCode));
    }

    #[test]
    fn test_geo_attribute_values_are_typed() {
        let attrs = GeoAttributes {
            country_code: Some("US".to_string()),
            latitude: Some(37.386),
            as_number: Some(15169),
            network: Some("8.8.8.0/24".parse().unwrap()),
            ..Default::default()
        };

        assert_eq!(attrs.value(GeoAttribute::CountryCode), Some(json!("US")));
        assert_eq!(attrs.value(GeoAttribute::Latitude), Some(json!(37.386)));
        assert_eq!(attrs.value(GeoAttribute::AsNumber), Some(json!(15169)));
        assert_eq!(attrs.value(GeoAttribute::Network), Some(json!("8.8.8.0/24")));
        assert_eq!(attrs.value(GeoAttribute::City), None);
        assert!(!attrs.is_empty());
    }

    #[test]
    fn test_geo_attributes_nan_is_absent() {
        let attrs = GeoAttributes {
            longitude: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(attrs.value(GeoAttribute::Longitude), None);
        assert!(attrs.is_empty());
    }
}
