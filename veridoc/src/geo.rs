// SPDX-License-Identifier: AGPL-3.0-or-later

//! Local (non-networked) IP-to-country resolution for visit logging.
use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use log::warn;
use maxminddb::geoip2;

/// A resolved country, ISO code plus best-effort English display name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Country {
    /// Two-letter ISO 3166-1 country code.
    pub code: String,

    /// English display name when the database carries one.
    pub name: Option<String>,
}

/// Resolves IP addresses to countries using a MaxMind database file.
///
/// The resolver is optional equipment, without a configured database file every lookup returns
/// `None` and visits are recorded without country information.
pub struct GeoResolver {
    reader: Option<maxminddb::Reader<Vec<u8>>>,
}

impl GeoResolver {
    /// Opens the MaxMind database at the given path.
    ///
    /// An unreadable or missing file only disables geo lookups, it never fails service startup.
    pub fn open(path: Option<&Path>) -> Self {
        let reader = path.and_then(|path| match maxminddb::Reader::open_readfile(path) {
            Ok(reader) => Some(reader),
            Err(error) => {
                warn!(
                    "Could not open GeoIP database {}, visits are recorded without country: {}",
                    path.display(),
                    error
                );
                None
            }
        });

        Self { reader }
    }

    /// Returns a resolver with geo lookups disabled.
    pub fn disabled() -> Self {
        Self { reader: None }
    }

    /// Looks up the country for an IP address.
    pub fn country(&self, ip: IpAddr) -> Option<Country> {
        let reader = self.reader.as_ref()?;
        let result: geoip2::Country = reader.lookup(ip).ok()?;
        let country = result.country?;
        let code = country.iso_code?.to_string();
        let name = country
            .names
            .and_then(|names| names.get("en").map(|name| (*name).to_string()));

        Some(Country { code, name })
    }
}

impl fmt::Debug for GeoResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoResolver")
            .field("enabled", &self.reader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use super::GeoResolver;

    #[test]
    fn disabled_resolver_returns_no_country() {
        let resolver = GeoResolver::disabled();
        assert_eq!(resolver.country("203.0.113.7".parse().unwrap()), None);
    }

    #[test]
    fn missing_database_file_disables_lookups() {
        let resolver = GeoResolver::open(Some(Path::new("/does/not/exist.mmdb")));
        assert_eq!(resolver.country("203.0.113.7".parse().unwrap()), None);
    }

    #[test]
    fn corrupt_database_file_disables_lookups() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a maxmind database").unwrap();

        let resolver = GeoResolver::open(Some(file.path()));
        assert_eq!(resolver.country("203.0.113.7".parse().unwrap()), None);
    }
}
