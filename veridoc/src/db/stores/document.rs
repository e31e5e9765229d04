// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::Utc;
use log::debug;
use rand::RngCore;
use sqlx::{query, query_as, query_scalar};

use crate::db::errors::DocumentStorageError;
use crate::db::models::DocumentRow;
use crate::db::types::{Document, DocumentFields};
use crate::db::SqlStore;

/// Maximum number of times a racing document creation retries number allocation before giving
/// up. Each retry re-reads the latest allocated number, the UNIQUE constraint on `doc_number`
/// guarantees that two creations can never both commit the same number.
const ALLOCATION_ATTEMPTS: u32 = 3;

/// Derives the next sequential document number from the most recently allocated one.
///
/// The numeric suffix is the trailing segment after the last separator, an absent or unparsable
/// suffix counts as zero. Numbers are zero-padded to three digits and grow naturally beyond that
/// (`-999` is followed by `-1000`).
pub fn next_document_number(prefix: &str, last: Option<&str>) -> String {
    let last_index = last
        .and_then(|number| number.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(0);

    format!("{}-{:03}", prefix, last_index + 1)
}

/// Mints a fresh verification token, 20 cryptographically random bytes as 40 upper-case hex
/// characters.
///
/// Collisions are not checked, at a probability of around 2^-160 they are accepted as
/// negligible.
pub fn mint_verify_token() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode_upper(bytes)
}

/// Returns true when the error is a UNIQUE constraint violation, for SQLite and Postgres.
fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(error) => {
            let code = error.code();
            code.as_deref() == Some("2067")
                || code.as_deref() == Some("1555")
                || code.as_deref() == Some("23505")
                || error.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

impl SqlStore {
    /// Registers a new document, allocating the next sequential document number and minting a
    /// random verification token.
    ///
    /// The read-compute-insert sequence runs inside a transaction and retries on a UNIQUE
    /// violation so concurrent creations never both succeed with the same number.
    pub async fn insert_document(
        &self,
        fields: &DocumentFields,
        prefix: &str,
    ) -> Result<Document, DocumentStorageError> {
        let fields = fields.normalized();

        for _ in 0..ALLOCATION_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            let last_number = query_scalar::<_, String>(
                "
                SELECT
                    doc_number
                FROM
                    documents
                WHERE
                    doc_number LIKE $1
                ORDER BY
                    id DESC
                LIMIT 1
                ",
            )
            .bind(format!("{}-%", prefix))
            .fetch_optional(&mut tx)
            .await?;

            let doc_number = next_document_number(prefix, last_number.as_deref());
            let verify_token = mint_verify_token();
            let created_at = Utc::now().to_rfc3339();

            let result = query(
                "
                INSERT INTO
                    documents (
                        doc_number,
                        doc_type,
                        party_one,
                        party_two,
                        party_one_id,
                        party_two_id,
                        status,
                        issue_date,
                        file_url,
                        verify_token,
                        created_at
                    )
                VALUES
                    ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ",
            )
            .bind(&doc_number)
            .bind(&fields.doc_type)
            .bind(&fields.party_one)
            .bind(&fields.party_two)
            .bind(&fields.party_one_id)
            .bind(&fields.party_two_id)
            .bind(&fields.status)
            .bind(&fields.issue_date)
            .bind(&fields.file_url)
            .bind(&verify_token)
            .bind(&created_at)
            .execute(&mut tx)
            .await;

            match result {
                Ok(_) => {
                    tx.commit().await?;

                    // The committed row is selected back to learn its assigned id
                    let row = self
                        .document_row_by_number(&doc_number)
                        .await?
                        .ok_or(sqlx::Error::RowNotFound)?;

                    return Ok(row.into());
                }
                Err(error) if is_unique_violation(&error) => {
                    debug!(
                        "Document number {} lost allocation race, retrying",
                        doc_number
                    );
                    tx.rollback().await.ok();
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(DocumentStorageError::NumberAllocation(ALLOCATION_ATTEMPTS))
    }

    /// Returns the document registered under the given document number.
    pub async fn get_document_by_number(
        &self,
        doc_number: &str,
    ) -> Result<Option<Document>, DocumentStorageError> {
        let row = self.document_row_by_number(doc_number).await?;
        Ok(row.map(Document::from))
    }

    /// Returns the document carrying the given verification token.
    ///
    /// Tokens are stored upper-cased, callers normalize before lookup.
    pub async fn get_document_by_token(
        &self,
        verify_token: &str,
    ) -> Result<Option<Document>, DocumentStorageError> {
        let row = query_as::<_, DocumentRow>(
            "
            SELECT
                id,
                doc_number,
                doc_type,
                party_one,
                party_two,
                party_one_id,
                party_two_id,
                status,
                issue_date,
                file_url,
                verify_token,
                created_at
            FROM
                documents
            WHERE
                verify_token = $1
            ",
        )
        .bind(verify_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    /// Updates the document registered under the given document number.
    ///
    /// Omitted or empty fields retain their prior values, `doc_number` and `verify_token` never
    /// change. Returns `None` when no document matches.
    pub async fn update_document_by_number(
        &self,
        doc_number: &str,
        fields: &DocumentFields,
    ) -> Result<Option<Document>, DocumentStorageError> {
        let row = match self.document_row_by_number(doc_number).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        self.persist_merged_fields(fields.apply_to(&row)).await
    }

    /// Updates the first document (lowest `id`) whose `party_two_id` matches.
    ///
    /// Same partial-update-by-omission policy as the primary update path, `doc_number` is
    /// immutable here as well.
    pub async fn update_document_by_party_two(
        &self,
        party_two_id: &str,
        fields: &DocumentFields,
    ) -> Result<Option<Document>, DocumentStorageError> {
        let row = match self.document_row_by_party_two(party_two_id).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        self.persist_merged_fields(fields.apply_to(&row)).await
    }

    /// Deletes the document registered under the given document number.
    ///
    /// Returns false when no row was affected.
    pub async fn delete_document_by_number(
        &self,
        doc_number: &str,
    ) -> Result<bool, DocumentStorageError> {
        let result = query(
            "
            DELETE FROM
                documents
            WHERE
                doc_number = $1
            ",
        )
        .bind(doc_number)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes at most one document (lowest `id`) whose `party_two_id` matches.
    ///
    /// Returns false when no row was affected.
    pub async fn delete_document_by_party_two(
        &self,
        party_two_id: &str,
    ) -> Result<bool, DocumentStorageError> {
        let result = query(
            "
            DELETE FROM
                documents
            WHERE
                id = (
                    SELECT
                        id
                    FROM
                        documents
                    WHERE
                        party_two_id = $1
                    ORDER BY
                        id ASC
                    LIMIT 1
                )
            ",
        )
        .bind(party_two_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring search over document number, type, both party names, status
    /// and the textual issue date.
    ///
    /// An empty query returns all documents, results are ordered by document number ascending.
    pub async fn search_documents(
        &self,
        search_query: &str,
    ) -> Result<Vec<Document>, DocumentStorageError> {
        let pattern = format!("%{}%", search_query.trim().to_lowercase());

        let rows = query_as::<_, DocumentRow>(
            "
            SELECT
                id,
                doc_number,
                doc_type,
                party_one,
                party_two,
                party_one_id,
                party_two_id,
                status,
                issue_date,
                file_url,
                verify_token,
                created_at
            FROM
                documents
            WHERE
                LOWER(doc_number) LIKE $1
                OR LOWER(COALESCE(doc_type, '')) LIKE $1
                OR LOWER(COALESCE(party_one, '')) LIKE $1
                OR LOWER(COALESCE(party_two, '')) LIKE $1
                OR LOWER(COALESCE(status, '')) LIKE $1
                OR LOWER(COALESCE(issue_date, '')) LIKE $1
            ORDER BY
                doc_number ASC
            ",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn document_row_by_number(
        &self,
        doc_number: &str,
    ) -> Result<Option<DocumentRow>, DocumentStorageError> {
        let row = query_as::<_, DocumentRow>(
            "
            SELECT
                id,
                doc_number,
                doc_type,
                party_one,
                party_two,
                party_one_id,
                party_two_id,
                status,
                issue_date,
                file_url,
                verify_token,
                created_at
            FROM
                documents
            WHERE
                doc_number = $1
            ",
        )
        .bind(doc_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn document_row_by_party_two(
        &self,
        party_two_id: &str,
    ) -> Result<Option<DocumentRow>, DocumentStorageError> {
        let row = query_as::<_, DocumentRow>(
            "
            SELECT
                id,
                doc_number,
                doc_type,
                party_one,
                party_two,
                party_one_id,
                party_two_id,
                status,
                issue_date,
                file_url,
                verify_token,
                created_at
            FROM
                documents
            WHERE
                party_two_id = $1
            ORDER BY
                id ASC
            LIMIT 1
            ",
        )
        .bind(party_two_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn persist_merged_fields(
        &self,
        merged: DocumentRow,
    ) -> Result<Option<Document>, DocumentStorageError> {
        query(
            "
            UPDATE
                documents
            SET
                doc_type = $1,
                party_one = $2,
                party_two = $3,
                party_one_id = $4,
                party_two_id = $5,
                status = $6,
                issue_date = $7,
                file_url = $8
            WHERE
                id = $9
            ",
        )
        .bind(&merged.doc_type)
        .bind(&merged.party_one)
        .bind(&merged.party_two)
        .bind(&merged.party_one_id)
        .bind(&merged.party_two_id)
        .bind(&merged.status)
        .bind(&merged.issue_date)
        .bind(&merged.file_url)
        .bind(merged.id)
        .execute(&self.pool)
        .await?;

        Ok(Some(merged.into()))
    }
}
