// SPDX-License-Identifier: AGPL-3.0-or-later

use sqlx::FromRow;

/// A struct representing a single document row as it is inserted in the database.
#[derive(FromRow, Debug, Clone)]
pub struct DocumentRow {
    /// Surrogate sequence key assigned by the store.
    pub id: i64,

    /// Unique human-readable document number, `<prefix>-<zero-padded-sequence>`.
    pub doc_number: String,

    /// Free-text document type.
    pub doc_type: Option<String>,

    /// Name of the first party.
    pub party_one: Option<String>,

    /// Name of the second party.
    pub party_two: Option<String>,

    /// Identifier of the first party, not guaranteed unique.
    pub party_one_id: Option<String>,

    /// Identifier of the second party, alternate admin lookup key.
    pub party_two_id: Option<String>,

    /// Free-text document status.
    pub status: Option<String>,

    /// ISO-8601 date (`YYYY-MM-DD`) the document was issued on.
    pub issue_date: Option<String>,

    /// Pointer to an externally stored artifact.
    pub file_url: Option<String>,

    /// Unique 40 character upper-case hex verification token.
    pub verify_token: String,

    /// RFC 3339 timestamp of row insertion.
    pub created_at: String,
}
