// SPDX-License-Identifier: AGPL-3.0-or-later

//! Declarative placeholder renderer for the static HTML templates.
//!
//! The templates themselves are opaque assets, the renderer only substitutes a fixed,
//! test-enumerable set of placeholders with document field values.
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::types::Document;

/// Rendered stand-in for a document field which is unset or empty.
pub const EMPTY_FIELD: &str = "-";

/// Rendered stand-in for a missing file pointer.
pub const NO_ATTACHMENT: &str = "no attachment";

/// File name of the verification page template.
pub const VERIFY_TEMPLATE: &str = "verify.html";

/// File name of the landing page template.
pub const INDEX_TEMPLATE: &str = "index.html";

/// File name of the admin login page template.
pub const LOGIN_TEMPLATE: &str = "login.html";

/// File name of the admin dashboard template.
pub const ADMIN_TEMPLATE: &str = "admin.html";

/// File name of the admin search page template.
pub const SEARCH_TEMPLATE: &str = "search.html";

/// File name of the visit log page template.
pub const VISITS_TEMPLATE: &str = "visits.html";

type Accessor = fn(&Document) -> Option<&str>;

type Formatter = fn(&str) -> Option<String>;

/// One placeholder substitution rule, a `{{key}}` marker bound to a document field with a
/// default and an optional display formatter.
pub struct PlaceholderSpec {
    /// Placeholder name as it appears between double curly braces in the template.
    pub key: &'static str,

    accessor: Accessor,
    default: &'static str,
    formatter: Option<Formatter>,
}

/// Returns the full, ordered substitution table applied to the verification template.
pub fn placeholders() -> Vec<PlaceholderSpec> {
    vec![
        PlaceholderSpec {
            key: "doc_number",
            accessor: |document| Some(document.doc_number.as_str()),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "doc_type",
            accessor: |document| document.doc_type.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "party_one",
            accessor: |document| document.party_one.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "party_two",
            accessor: |document| document.party_two.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "party_one_id",
            accessor: |document| document.party_one_id.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "party_two_id",
            accessor: |document| document.party_two_id.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "status",
            accessor: |document| document.status.as_deref(),
            default: EMPTY_FIELD,
            formatter: None,
        },
        PlaceholderSpec {
            key: "issue_date",
            accessor: |document| document.issue_date.as_deref(),
            default: EMPTY_FIELD,
            formatter: Some(format_issue_date),
        },
        PlaceholderSpec {
            key: "file_url",
            accessor: |document| document.file_url.as_deref(),
            default: NO_ATTACHMENT,
            formatter: None,
        },
    ]
}

/// Substitutes every occurrence of each placeholder in the template with the corresponding
/// document field value.
///
/// Empty or missing fields render as the placeholder's default, an unparsable issue date falls
/// back to the default as well.
pub fn render_document(template: &str, document: &Document) -> String {
    let mut output = template.to_string();

    for spec in placeholders() {
        let value = match (spec.accessor)(document) {
            Some(raw) if !raw.trim().is_empty() => match spec.formatter {
                Some(format) => format(raw).unwrap_or_else(|| spec.default.to_string()),
                None => raw.to_string(),
            },
            _ => spec.default.to_string(),
        };

        output = output.replace(&format!("{{{{{}}}}}", spec.key), &value);
    }

    output
}

/// Reads a template file from the configured templates directory.
pub async fn load_template(base_path: &Path, name: &str) -> Result<String> {
    let template = tokio::fs::read_to_string(base_path.join(name)).await?;
    Ok(template)
}

/// Formats an ISO-8601 date for display, for example `2024-06-03` as `3 June 2024`.
fn format_issue_date(raw: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    Some(date.format("%-d %B %Y").to_string())
}
