// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP service serving the public verification pages and the session-gated admin API.
mod api;
mod context;
mod errors;
mod service;
mod session;

pub use context::HttpServiceContext;
pub use errors::ApiError;
pub use service::{build_server, http_service};
pub use session::{AdminSession, SessionStore, SESSION_COOKIE_NAME};
