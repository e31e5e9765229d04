// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::bus::ServiceSender;
use crate::config::Configuration;
use crate::db::SqlStore;
use crate::http::session::SessionStore;

#[derive(Clone, Debug)]
pub struct HttpServiceContext {
    /// SQL database.
    pub store: SqlStore,

    /// Store of authenticated admin sessions.
    pub sessions: SessionStore,

    /// Service configuration.
    pub config: Configuration,

    /// Sender for the communication bus, used to publish verification-page visits.
    pub tx: ServiceSender,
}

impl HttpServiceContext {
    pub fn new(
        store: SqlStore,
        sessions: SessionStore,
        config: Configuration,
        tx: ServiceSender,
    ) -> Self {
        Self {
            store,
            sessions,
            config,
            tx,
        }
    }
}
