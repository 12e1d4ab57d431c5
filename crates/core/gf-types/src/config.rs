//! Configuration types for GeoIP enrichment.

use crate::{DatabaseType, GeoAttribute};
use gf_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database location used when `db_path` is not configured.
pub const DEFAULT_DATABASE_PATH: &str = "/var/lib/GeoIP/GeoLite2-City.mmdb";

/// A lookup rule: which field holds the address and where results go.
///
/// Key names are the operator-facing contract and must stay stable. An empty
/// destination name means that attribute is not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRule {
    /// Field holding the textual IP address.
    #[serde(rename = "field", default)]
    pub source_field: String,

    /// Destination for the country ISO code (`dest` is the legacy key).
    #[serde(default, alias = "dest")]
    pub dest_country: String,

    #[serde(default)]
    pub dest_city: String,

    #[serde(default)]
    pub dest_lat: String,

    #[serde(default)]
    pub dest_lon: String,

    #[serde(rename = "dest_autonomous_system_number", default)]
    pub dest_as_number: String,

    #[serde(rename = "dest_autonomous_system_organization", default)]
    pub dest_as_org: String,

    #[serde(default)]
    pub dest_network: String,
}

impl LookupRule {
    /// Creates a rule reading from `source_field` with no destinations.
    pub fn new(source_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            ..Default::default()
        }
    }

    /// Sets the destination field for an attribute.
    pub fn with_dest(mut self, attribute: GeoAttribute, field: impl Into<String>) -> Self {
        let field = field.into();
        match attribute {
            GeoAttribute::CountryCode => self.dest_country = field,
            GeoAttribute::City => self.dest_city = field,
            GeoAttribute::Latitude => self.dest_lat = field,
            GeoAttribute::Longitude => self.dest_lon = field,
            GeoAttribute::AsNumber => self.dest_as_number = field,
            GeoAttribute::AsOrganization => self.dest_as_org = field,
            GeoAttribute::Network => self.dest_network = field,
        }
        self
    }

    /// Returns the configured destination field for an attribute (may be empty).
    pub fn dest(&self, attribute: GeoAttribute) -> &str {
        match attribute {
            GeoAttribute::CountryCode => &self.dest_country,
            GeoAttribute::City => &self.dest_city,
            GeoAttribute::Latitude => &self.dest_lat,
            GeoAttribute::Longitude => &self.dest_lon,
            GeoAttribute::AsNumber => &self.dest_as_number,
            GeoAttribute::AsOrganization => &self.dest_as_org,
            GeoAttribute::Network => &self.dest_network,
        }
    }

    /// Iterates over attributes with a non-empty destination field.
    pub fn destinations(&self) -> impl Iterator<Item = (GeoAttribute, &str)> {
        GeoAttribute::ALL
            .into_iter()
            .map(|attribute| (attribute, self.dest(attribute)))
            .filter(|(_, field)| !field.is_empty())
    }

    /// A rule without a source field never does anything.
    pub fn is_inert(&self) -> bool {
        self.source_field.is_empty()
    }
}

/// Validated enrichment settings.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Location of the geolocation database.
    pub database_path: PathBuf,

    /// Which kind of database lives at `database_path`.
    pub database_type: DatabaseType,

    /// Lookup rules, applied in order.
    pub rules: Vec<LookupRule>,
}

impl EnrichmentConfig {
    /// Creates a config with no rules.
    pub fn new(database_path: impl Into<PathBuf>, database_type: DatabaseType) -> Self {
        Self {
            database_path: database_path.into(),
            database_type,
            rules: Vec::new(),
        }
    }

    /// Appends a lookup rule.
    pub fn with_rule(mut self, rule: LookupRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parses a TOML configuration document.
    ///
    /// Accepts either the settings at the document root or nested under a
    /// `[[processors.geoip]]` table, in which case the first table is used.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let root: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let section = match plugin_section(&root) {
            Some(section) => section.clone(),
            None => root,
        };

        let document: ConfigDocument = toml::Value::Table(section)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

        document.try_into()
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

/// Raw configuration document, before validation.
#[derive(Debug, Deserialize)]
struct ConfigDocument {
    #[serde(default = "default_database_path", alias = "country_db")]
    db_path: String,

    #[serde(default)]
    db_type: String,

    #[serde(rename = "lookup", default)]
    lookups: Vec<LookupRule>,
}

fn default_database_path() -> String {
    DEFAULT_DATABASE_PATH.to_string()
}

impl TryFrom<ConfigDocument> for EnrichmentConfig {
    type Error = ConfigError;

    fn try_from(document: ConfigDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            database_path: PathBuf::from(document.db_path),
            database_type: document.db_type.parse()?,
            rules: document.lookups,
        })
    }
}

/// Finds the first `processors.geoip` table, if the document uses that layout.
fn plugin_section(root: &toml::Table) -> Option<&toml::Table> {
    let geoip = root.get("processors")?.as_table()?.get("geoip")?;
    match geoip {
        toml::Value::Array(tables) => tables.first()?.as_table(),
        toml::Value::Table(table) => Some(table),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = EnrichmentConfig::from_toml_str(
            r#"
db_path = "/data/GeoLite2-City.mmdb"
db_type = "city"

[[lookup]]
field = "source_ip"
dest_country = "source_country"
dest_city = "source_city"
dest_lat = "source_lat"
dest_lon = "source_lon"

[[lookup]]
field = "dest_ip"
dest_autonomous_system_number = "dest_asn"
dest_autonomous_system_organization = "dest_as_org"
dest_network = "dest_network"
"#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/GeoLite2-City.mmdb"));
        assert_eq!(config.database_type, DatabaseType::City);
        assert_eq!(config.rules.len(), 2);

        let first = &config.rules[0];
        assert_eq!(first.source_field, "source_ip");
        assert_eq!(first.dest(GeoAttribute::City), "source_city");
        assert_eq!(first.dest(GeoAttribute::Network), "");

        let second = &config.rules[1];
        assert_eq!(second.dest_as_number, "dest_asn");
        assert_eq!(second.dest_as_org, "dest_as_org");
        assert_eq!(second.dest_network, "dest_network");
    }

    #[test]
    fn test_parse_legacy_keys() {
        let config = EnrichmentConfig::from_toml_str(
            r#"
country_db = "/home/geo/GeoLite2-Country.mmdb"
db_type = "country"

[[lookup]]
field = "source_ip"
dest = "source_country"
"#,
        )
        .unwrap();

        assert_eq!(
            config.database_path,
            PathBuf::from("/home/geo/GeoLite2-Country.mmdb")
        );
        assert_eq!(config.database_type, DatabaseType::Country);
        assert_eq!(config.rules[0].dest_country, "source_country");
    }

    #[test]
    fn test_parse_defaults() {
        let config = EnrichmentConfig::from_toml_str("").unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.database_type, DatabaseType::City);
        assert!(config.rules.is_empty());

        let config = EnrichmentConfig::from_toml_str(r#"db_type = """#).unwrap();
        assert_eq!(config.database_type, DatabaseType::City);
    }

    #[test]
    fn test_parse_plugin_section() {
        let config = EnrichmentConfig::from_toml_str(
            r#"
[[processors.geoip]]
db_path = "/data/GeoLite2-ASN.mmdb"
db_type = "asn"

[[processors.geoip.lookup]]
field = "client_ip"
dest_network = "client_network"
"#,
        )
        .unwrap();

        assert_eq!(config.database_type, DatabaseType::Asn);
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].source_field, "client_ip");
        assert_eq!(config.rules[0].dest_network, "client_network");
    }

    #[test]
    fn test_parse_unknown_database_type() {
        let err = EnrichmentConfig::from_toml_str(r#"db_type = "isp""#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatabaseType(_)));
    }

    #[test]
    fn test_parse_invalid_document() {
        let err = EnrichmentConfig::from_toml_str("db_path = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = EnrichmentConfig::from_toml_str("db_path = 42").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"db_type = \"asn\"\n[[lookup]]\nfield = \"ip\"\n")
            .unwrap();

        let config = EnrichmentConfig::load(file.path()).unwrap();
        assert_eq!(config.database_type, DatabaseType::Asn);
        assert_eq!(config.rules[0].source_field, "ip");
    }

    #[test]
    fn test_load_missing_file() {
        let err = EnrichmentConfig::load("/nonexistent/geoip.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_rule_destinations_skip_empty() {
        let rule = LookupRule::new("source_ip")
            .with_dest(GeoAttribute::CountryCode, "country")
            .with_dest(GeoAttribute::Network, "net");

        let dests: Vec<_> = rule.destinations().collect();
        assert_eq!(
            dests,
            vec![
                (GeoAttribute::CountryCode, "country"),
                (GeoAttribute::Network, "net"),
            ]
        );
        assert!(!rule.is_inert());
        assert!(LookupRule::default().is_inert());
    }
}
