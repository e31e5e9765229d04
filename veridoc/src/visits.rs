// SPDX-License-Identifier: AGPL-3.0-or-later

//! Best-effort visit logging for public verification-page accesses.
//!
//! The HTTP service publishes a [`VisitRecord`] on the communication bus for every verification
//! request and moves on, this service consumes the records, resolves the country for the client
//! IP and appends one row to the visit log. Failures anywhere in this pipeline are logged and
//! swallowed, they never reach the client.
use std::net::SocketAddr;

use anyhow::Result;
use http::header::{HeaderMap, REFERER, USER_AGENT};
use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::bus::{ServiceMessage, ServiceSender};
use crate::context::Context;
use crate::db::types::NewVisit;
use crate::manager::Shutdown;

/// Everything the HTTP service captures about one verification-page access.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VisitRecord {
    /// Verification token taken from the URL path, already normalized.
    pub token: String,

    /// Full requested URL.
    pub url: String,

    /// Client IP address.
    pub ip: Option<String>,

    /// `User-Agent` request header.
    pub user_agent: Option<String>,

    /// `Referer` request header.
    pub referrer: Option<String>,
}

impl VisitRecord {
    /// Captures a visit record from the parts of an incoming verification request.
    pub fn from_request(
        token: &str,
        url: &str,
        headers: &HeaderMap,
        remote: Option<SocketAddr>,
    ) -> Self {
        Self {
            token: token.to_string(),
            url: url.to_string(),
            ip: client_ip(headers, remote),
            user_agent: header_value(headers, USER_AGENT.as_str()),
            referrer: header_value(headers, REFERER.as_str()),
        }
    }
}

/// Determines the client IP, preferring the first hop of a proxy-forwarded header chain over
/// the raw socket address and stripping an IPv4-mapped-IPv6 prefix if present.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned);

    let ip = match forwarded {
        Some(ip) => ip,
        None => remote?.ip().to_string(),
    };

    Some(ip.strip_prefix("::ffff:").unwrap_or(&ip).to_string())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Visit logger service consuming `PageVisited` messages from the bus.
pub async fn visits_service(
    context: Context,
    mut shutdown: Shutdown,
    tx: ServiceSender,
) -> Result<()> {
    let mut rx = tx.subscribe();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            message = rx.recv() => match message {
                Ok(ServiceMessage::PageVisited(record)) => record_visit(&context, record).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Visit logger lagging behind, {} visits dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

/// Resolves the country and appends one visit row, containing every failure.
async fn record_visit(context: &Context, record: VisitRecord) {
    let country = record
        .ip
        .as_deref()
        .and_then(|ip| ip.parse().ok())
        .and_then(|ip| context.geo.country(ip));

    let (country_name, country_code) = match country {
        Some(country) => {
            let name = country.name.clone().unwrap_or_else(|| country.code.clone());
            (Some(name), Some(country.code))
        }
        None => (None, None),
    };

    let visit = NewVisit {
        token: record.token,
        url: record.url,
        ip: record.ip,
        country: country_name,
        country_code,
        user_agent: record.user_agent,
        referrer: record.referrer,
    };

    match context.store.insert_visit(&visit).await {
        Ok(()) => debug!("Recorded verification page visit for {}", visit.token),
        Err(error) => warn!("Could not record verification page visit: {}", error),
    }
}
