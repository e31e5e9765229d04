// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use anyhow::Result;
use log::warn;

use crate::bus::ServiceMessage;
use crate::config::Configuration;
use crate::context::Context;
use crate::db::{connection_pool, create_database, run_pending_migrations, Pool, SqlStore};
use crate::geo::GeoResolver;
use crate::http::{http_service, SessionStore};
use crate::manager::ServiceManager;
use crate::visits::visits_service;

/// Capacity of the internal broadcast channel used to communicate between services.
const SERVICE_BUS_CAPACITY: usize = 512_000;

/// Number of attempts to reach the database during startup.
const DB_CONNECT_ATTEMPTS: u32 = 5;

/// Delay between database connection attempts.
const DB_CONNECT_DELAY: Duration = Duration::from_secs(2);

/// Makes sure database is created and migrated before returning connection pool.
///
/// The database may come up later than the service, connecting is retried on a bounded schedule
/// before giving up.
async fn initialize_db(config: &Configuration) -> Result<Pool> {
    let mut attempt = 1;

    let pool = loop {
        let result = async {
            // Create database when not existing
            create_database(&config.database_url).await?;

            // Create connection pool
            connection_pool(&config.database_url, config.database_max_connections).await
        }
        .await;

        match result {
            Ok(pool) => break pool,
            Err(err) if attempt < DB_CONNECT_ATTEMPTS => {
                warn!(
                    "Could not connect to database (attempt {}/{}): {}",
                    attempt, DB_CONNECT_ATTEMPTS, err
                );
                attempt += 1;
                tokio::time::sleep(DB_CONNECT_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    };

    // Run pending migrations
    run_pending_migrations(&pool).await?;

    Ok(pool)
}

/// Main runtime managing the document verification node process.
#[allow(missing_debug_implementations)]
pub struct Node {
    pool: Pool,
    manager: ServiceManager<Context, ServiceMessage>,
}

impl Node {
    /// Start the node with your configuration. This method can be used to run the service within
    /// other applications.
    pub async fn start(config: Configuration) -> Self {
        // Initialize database and get connection pool
        let pool = initialize_db(&config)
            .await
            .expect("Could not initialize database");

        // Prepare storage using connection pool
        let store = SqlStore::new(pool.clone());

        if config.admin_username == "admin" && config.admin_password == "admin" {
            warn!("Admin account uses the development default credentials");
        }

        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
        let geo = GeoResolver::open(config.geoip_database_path.as_deref());

        // Create service manager with shared data between services
        let context = Context::new(store, config, sessions, geo);
        let mut manager =
            ServiceManager::<Context, ServiceMessage>::new(SERVICE_BUS_CAPACITY, context);

        // Start visit logger consuming verification-page accesses from the bus
        manager.add("visits", visits_service);

        // Start HTTP server with the verification pages and admin API
        manager.add("http", http_service);

        Self { pool, manager }
    }

    /// This future resolves when at least one system service stopped.
    ///
    /// It can be used to exit the application as a stopped service usually means that something
    /// went wrong.
    pub async fn on_exit(&self) {
        self.manager.on_exit().await;
    }

    /// Close all running concurrent tasks and wait until they are fully shut down.
    pub async fn shutdown(self) {
        // Wait until all tasks are shut down
        self.manager.shutdown().await;

        // Close connection pool
        self.pool.close().await;
    }
}
