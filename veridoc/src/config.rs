// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration object holding all important variables throughout the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// URL / connection string to PostgreSQL or SQLite database.
    pub database_url: String,

    /// Maximum number of connections that the database pool should maintain.
    ///
    /// Be mindful of the connection limits for the database as well as other applications which
    /// may want to connect to the same database.
    pub database_max_connections: u32,

    /// HTTP port serving the verification pages and the admin API. Defaults to 3000.
    pub http_port: u16,

    /// Username checked by the admin login endpoint.
    pub admin_username: String,

    /// Password checked by the admin login endpoint.
    pub admin_password: String,

    /// Lifetime of an authenticated admin session in seconds. Defaults to 24 hours.
    pub session_ttl_secs: u64,

    /// Fixed prefix for generated document numbers, for example `DOC` resulting in numbers like
    /// `DOC-001`.
    pub document_number_prefix: String,

    /// Path to a MaxMind country database file used for local IP geolocation of
    /// verification-page visits.
    ///
    /// When not set, visits are still recorded but without country information.
    pub geoip_database_path: Option<PathBuf>,

    /// Directory holding the static HTML templates (verify, login, admin, search, visits pages).
    pub templates_base_path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            database_max_connections: 32,
            http_port: 3000,
            admin_username: "admin".into(),
            admin_password: "admin".into(),
            session_ttl_secs: 60 * 60 * 24,
            document_number_prefix: "DOC".into(),
            geoip_database_path: None,
            templates_base_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates"),
        }
    }
}
