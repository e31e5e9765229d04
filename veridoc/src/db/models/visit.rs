// SPDX-License-Identifier: AGPL-3.0-or-later

use sqlx::FromRow;

/// A struct representing a single visit log row as it is inserted in the database.
#[derive(FromRow, Debug, Clone)]
pub struct VisitRow {
    /// Surrogate sequence key assigned by the store.
    pub id: i64,

    /// Verification token taken from the requested URL path.
    pub token: String,

    /// Full requested URL.
    pub url: String,

    /// Client IP address, proxy-forwarded header preferred over the socket address.
    pub ip: Option<String>,

    /// Country display name resolved from the IP.
    pub country: Option<String>,

    /// ISO country code resolved from the IP.
    pub country_code: Option<String>,

    /// `User-Agent` request header.
    pub user_agent: Option<String>,

    /// `Referer` request header.
    pub referrer: Option<String>,

    /// RFC 3339 timestamp of row insertion.
    pub created_at: String,
}
