// SPDX-License-Identifier: AGPL-3.0-or-later

use rstest::fixture;

use crate::db::types::DocumentFields;

/// Fixture providing a filled set of document fields for store and API tests.
#[fixture]
pub fn sample_fields() -> DocumentFields {
    DocumentFields {
        doc_type: Some("Lease Agreement".to_string()),
        party_one: Some("Acme Holdings".to_string()),
        party_two: Some("Jane Miller".to_string()),
        party_one_id: Some("A-77".to_string()),
        party_two_id: Some("P2-551".to_string()),
        status: Some("active".to_string()),
        issue_date: Some("2024-06-03".to_string()),
        file_url: None,
    }
}
