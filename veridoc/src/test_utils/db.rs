// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::db::{connection_pool, create_database, run_pending_migrations, Pool};
use crate::test_utils::TestConfiguration;

/// Create a fresh, fully migrated test database.
pub async fn initialize_db() -> Pool {
    let config = TestConfiguration::new();
    create_database(&config.database_url).await.unwrap();

    // A single connection keeps the in-memory database alive across the whole test
    let pool = connection_pool(&config.database_url, 1).await.unwrap();
    if run_pending_migrations(&pool).await.is_err() {
        pool.close().await;
    }

    pool
}
