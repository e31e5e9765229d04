// SPDX-License-Identifier: AGPL-3.0-or-later

use std::ops::Deref;
use std::sync::Arc;

use crate::config::Configuration;
use crate::db::SqlStore;
use crate::geo::GeoResolver;
use crate::http::SessionStore;

/// Inner data shared across all services.
#[derive(Debug)]
pub struct Data {
    /// Service configuration.
    pub config: Configuration,

    /// SQL storage with database connection pool.
    pub store: SqlStore,

    /// Admin session store mapping session identifiers to authenticated state.
    pub sessions: SessionStore,

    /// Local IP-to-country resolver for visit logging.
    pub geo: GeoResolver,
}

impl Data {
    pub fn new(
        store: SqlStore,
        config: Configuration,
        sessions: SessionStore,
        geo: GeoResolver,
    ) -> Self {
        Self {
            config,
            store,
            sessions,
            geo,
        }
    }
}

/// Data shared across all services.
#[derive(Debug)]
pub struct Context(pub Arc<Data>);

impl Context {
    /// Returns a new instance of `Context`.
    pub fn new(
        store: SqlStore,
        config: Configuration,
        sessions: SessionStore,
        geo: GeoResolver,
    ) -> Self {
        Self(Arc::new(Data::new(store, config, sessions, geo)))
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl Deref for Context {
    type Target = Data;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
