// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use crate::config::Configuration;
use crate::context::Context;
use crate::db::SqlStore;
use crate::geo::GeoResolver;
use crate::http::SessionStore;

/// Test node which contains a context with an [`SqlStore`].
pub struct TestNode {
    pub context: Context,
}

impl TestNode {
    pub fn new(store: SqlStore) -> Self {
        let config = Configuration::default();
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));

        Self {
            context: Context::new(store, config, sessions, GeoResolver::disabled()),
        }
    }
}
