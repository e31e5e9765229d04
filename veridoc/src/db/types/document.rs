// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::db::models::DocumentRow;

/// A registered document as returned by the store and serialized on the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Surrogate sequence key assigned by the store, immutable.
    pub id: i64,

    /// Unique human-readable document number, immutable once created.
    pub doc_number: String,

    /// Free-text document type.
    pub doc_type: Option<String>,

    /// Name of the first party.
    pub party_one: Option<String>,

    /// Name of the second party.
    pub party_two: Option<String>,

    /// Identifier of the first party.
    pub party_one_id: Option<String>,

    /// Identifier of the second party, alternate admin lookup key.
    pub party_two_id: Option<String>,

    /// Free-text document status.
    pub status: Option<String>,

    /// ISO-8601 date (`YYYY-MM-DD`) the document was issued on.
    pub issue_date: Option<String>,

    /// Pointer to an externally stored artifact.
    pub file_url: Option<String>,

    /// Unique verification token granting public read access to this document's rendered
    /// summary, immutable once created.
    pub verify_token: String,

    /// RFC 3339 timestamp of creation.
    pub created_at: String,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            doc_number: row.doc_number,
            doc_type: row.doc_type,
            party_one: row.party_one,
            party_two: row.party_two,
            party_one_id: row.party_one_id,
            party_two_id: row.party_two_id,
            status: row.status,
            issue_date: row.issue_date,
            file_url: row.file_url,
            verify_token: row.verify_token,
            created_at: row.created_at,
        }
    }
}

/// Incoming mutable document fields as submitted by the admin UI.
///
/// Fields which are `None` or empty leave the prior value untouched when applied to an existing
/// document (partial-update-by-omission). `doc_number` and `verify_token` are not part of this
/// struct, they never change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFields {
    /// Free-text document type.
    pub doc_type: Option<String>,

    /// Name of the first party.
    pub party_one: Option<String>,

    /// Name of the second party.
    pub party_two: Option<String>,

    /// Identifier of the first party.
    pub party_one_id: Option<String>,

    /// Identifier of the second party.
    pub party_two_id: Option<String>,

    /// Free-text document status.
    pub status: Option<String>,

    /// ISO-8601 date the document was issued on.
    pub issue_date: Option<String>,

    /// Pointer to an externally stored artifact.
    pub file_url: Option<String>,
}

impl DocumentFields {
    /// Applies these fields on top of an existing row, retaining prior values for every field
    /// which was omitted or submitted empty.
    pub fn apply_to(&self, row: &DocumentRow) -> DocumentRow {
        let mut merged = row.clone();
        merged.doc_type = merge_field(&self.doc_type, &row.doc_type);
        merged.party_one = merge_field(&self.party_one, &row.party_one);
        merged.party_two = merge_field(&self.party_two, &row.party_two);
        merged.party_one_id = merge_field(&self.party_one_id, &row.party_one_id);
        merged.party_two_id = merge_field(&self.party_two_id, &row.party_two_id);
        merged.status = merge_field(&self.status, &row.status);
        merged.issue_date = merge_field(&self.issue_date, &row.issue_date);
        merged.file_url = merge_field(&self.file_url, &row.file_url);
        merged
    }

    /// Normalizes submitted fields for insertion, empty strings become `None`.
    pub fn normalized(&self) -> Self {
        Self {
            doc_type: non_empty(&self.doc_type),
            party_one: non_empty(&self.party_one),
            party_two: non_empty(&self.party_two),
            party_one_id: non_empty(&self.party_one_id),
            party_two_id: non_empty(&self.party_two_id),
            status: non_empty(&self.status),
            issue_date: non_empty(&self.issue_date),
            file_url: non_empty(&self.file_url),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn merge_field(incoming: &Option<String>, prior: &Option<String>) -> Option<String> {
    non_empty(incoming).or_else(|| prior.clone())
}
