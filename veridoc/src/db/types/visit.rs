// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::Serialize;

use crate::db::models::VisitRow;

/// A recorded verification-page visit as serialized on the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    /// Surrogate sequence key assigned by the store.
    pub id: i64,

    /// Verification token taken from the requested URL path.
    pub token: String,

    /// Full requested URL.
    pub url: String,

    /// Client IP address.
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

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            url: row.url,
            ip: row.ip,
            country: row.country,
            country_code: row.country_code,
            user_agent: row.user_agent,
            referrer: row.referrer,
            created_at: row.created_at,
        }
    }
}

/// A visit entry ready for insertion, geo lookup already performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    /// Verification token taken from the requested URL path.
    pub token: String,

    /// Full requested URL.
    pub url: String,

    /// Client IP address.
    pub ip: Option<String>,

    /// Country display name resolved from the IP.
    pub country: Option<String>,

    /// ISO country code resolved from the IP.
    pub country_code: Option<String>,

    /// `User-Agent` request header.
    pub user_agent: Option<String>,

    /// `Referer` request header.
    pub referrer: Option<String>,
}
