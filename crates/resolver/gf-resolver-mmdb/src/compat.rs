//! Database type compatibility checks.

use gf_types::DatabaseType;

/// Returns true if a database whose metadata reports `database_type` (for
/// example "GeoLite2-City") can serve lookups of the configured type.
///
/// City and Enterprise databases carry country data, so they also serve
/// country lookups. ISP databases carry AS data.
pub fn is_compatible(configured: DatabaseType, database_type: &str) -> bool {
    let found = database_type.to_ascii_lowercase();
    let has = |needle: &str| found.contains(needle);

    match configured {
        DatabaseType::City => has("city") || has("enterprise"),
        DatabaseType::Country => has("country") || has("city") || has("enterprise"),
        DatabaseType::Asn => has("asn") || has("isp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_requires_city_data() {
        assert!(is_compatible(DatabaseType::City, "GeoLite2-City"));
        assert!(is_compatible(DatabaseType::City, "GeoIP2-Enterprise"));
        assert!(is_compatible(DatabaseType::City, "DBIP-City-Lite"));
        assert!(!is_compatible(DatabaseType::City, "GeoLite2-Country"));
        assert!(!is_compatible(DatabaseType::City, "GeoLite2-ASN"));
    }

    #[test]
    fn test_country_accepts_city_databases() {
        assert!(is_compatible(DatabaseType::Country, "GeoLite2-Country"));
        assert!(is_compatible(DatabaseType::Country, "GeoIP2-City"));
        assert!(!is_compatible(DatabaseType::Country, "GeoLite2-ASN"));
    }

    #[test]
    fn test_asn_requires_as_data() {
        assert!(is_compatible(DatabaseType::Asn, "GeoLite2-ASN"));
        assert!(is_compatible(DatabaseType::Asn, "GeoIP2-ISP"));
        assert!(!is_compatible(DatabaseType::Asn, "GeoLite2-City"));
    }
}
