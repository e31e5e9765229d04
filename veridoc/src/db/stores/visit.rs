// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::Utc;
use sqlx::{query, query_as};

use crate::db::errors::VisitStorageError;
use crate::db::models::VisitRow;
use crate::db::types::{NewVisit, Visit};
use crate::db::SqlStore;

/// Upper bound of rows returned by the visit log views.
const VISIT_LOG_LIMIT: i64 = 500;

impl SqlStore {
    /// Appends one row to the visit log.
    ///
    /// The visit log is append-only, rows are never updated. The referenced token is a soft
    /// reference, the document may have been deleted in the meantime.
    pub async fn insert_visit(&self, visit: &NewVisit) -> Result<(), VisitStorageError> {
        query(
            "
            INSERT INTO
                visits (
                    token,
                    url,
                    ip,
                    country,
                    country_code,
                    user_agent,
                    referrer,
                    created_at
                )
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(&visit.token)
        .bind(&visit.url)
        .bind(&visit.ip)
        .bind(&visit.country)
        .bind(&visit.country_code)
        .bind(&visit.user_agent)
        .bind(&visit.referrer)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns the most recent visit log entries, newest first.
    pub async fn get_visits(&self) -> Result<Vec<Visit>, VisitStorageError> {
        let rows = query_as::<_, VisitRow>(
            "
            SELECT
                id,
                token,
                url,
                ip,
                country,
                country_code,
                user_agent,
                referrer,
                created_at
            FROM
                visits
            ORDER BY
                id DESC
            LIMIT $1
            ",
        )
        .bind(VISIT_LOG_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Visit::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::types::NewVisit;
    use crate::test_utils::{test_runner, TestNode};

    fn sample_visit(token: &str) -> NewVisit {
        NewVisit {
            token: token.to_string(),
            url: format!("/verify/{}", token),
            ip: Some("203.0.113.7".to_string()),
            country: Some("Netherlands".to_string()),
            country_code: Some("NL".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referrer: None,
        }
    }

    #[test]
    fn visits_are_appended_and_listed_newest_first() {
        test_runner(|node: TestNode| async move {
            let store = &node.context.store;

            store.insert_visit(&sample_visit("AAA111")).await.unwrap();
            store.insert_visit(&sample_visit("BBB222")).await.unwrap();

            let visits = store.get_visits().await.unwrap();
            assert_eq!(visits.len(), 2);
            assert_eq!(visits[0].token, "BBB222");
            assert_eq!(visits[1].token, "AAA111");
            assert_eq!(visits[1].country_code.as_deref(), Some("NL"));
            assert!(!visits[0].created_at.is_empty());
        });
    }

    #[test]
    fn visits_reference_tokens_softly() {
        test_runner(|node: TestNode| async move {
            // A visit for a token with no matching document is still recorded
            node.context
                .store
                .insert_visit(&sample_visit("0000000000000000000000000000000000000000"))
                .await
                .unwrap();

            let visits = node.context.store.get_visits().await.unwrap();
            assert_eq!(visits.len(), 1);
        });
    }
}
