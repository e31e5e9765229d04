// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory admin session store and the extractor gating protected routes.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use rand::RngCore;
use tokio::sync::RwLock;

use crate::http::context::HttpServiceContext;
use crate::http::errors::ApiError;

/// Name of the cookie carrying the admin session id.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Number of random bytes in a session id, hex-encoded for the cookie.
const SESSION_ID_LENGTH: usize = 32;

/// In-memory store of authenticated admin sessions.
///
/// Sessions only exist after a successful credential check and expire after the configured
/// lifetime, there is no logout. State is process-local, a restart signs every admin out.
#[derive(Clone, Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, Instant>>>,
}

impl SessionStore {
    /// Returns a new session store with the given session lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Mints a fresh session id and registers it as authenticated.
    pub async fn create(&self) -> String {
        let mut bytes = [0u8; SESSION_ID_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);
        let session_id = hex::encode(bytes);

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Instant::now());

        session_id
    }

    /// Checks whether the given session id belongs to a live session.
    ///
    /// Expired sessions are removed on access.
    pub async fn is_authenticated(&self, session_id: &str) -> bool {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(created_at) => created_at.elapsed() >= self.ttl,
                None => return false,
            }
        };

        if expired {
            self.sessions.write().await.remove(session_id);
            return false;
        }

        true
    }
}

/// Witness of an authenticated admin session.
///
/// Protected handlers take this extractor as their entry check, anonymous requests are rejected
/// with a structured 401 before the handler body runs.
#[derive(Clone, Copy, Debug)]
pub struct AdminSession;

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sessions = parts
            .extensions
            .get::<HttpServiceContext>()
            .map(|context| context.sessions.clone())
            .ok_or_else(|| ApiError::Upstream(anyhow!("HTTP service context not available")))?;

        let session_id =
            cookie_value(&parts.headers, SESSION_COOKIE_NAME).ok_or(ApiError::Unauthorized)?;

        if sessions.is_authenticated(&session_id).await {
            Ok(AdminSession)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Extracts one cookie value from the `Cookie` request header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;

    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::HeaderMap;

    use super::{cookie_value, SessionStore, SESSION_COOKIE_NAME};

    #[tokio::test]
    async fn created_sessions_authenticate() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session_id = store.create().await;

        assert_eq!(session_id.len(), 64);
        assert!(store.is_authenticated(&session_id).await);
        assert!(!store.is_authenticated("unknown").await);
    }

    #[tokio::test]
    async fn sessions_expire_after_ttl() {
        let store = SessionStore::new(Duration::ZERO);
        let session_id = store.create().await;

        assert!(!store.is_authenticated(&session_id).await);
        // The expired entry was removed on access
        assert!(!store.is_authenticated(&session_id).await);
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert_ne!(store.create().await, store.create().await);
    }

    #[test]
    fn cookie_values_are_parsed_from_the_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            "theme=dark; session=abc123; lang=en".parse().unwrap(),
        );

        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE_NAME),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value(&headers, "lang"), Some("en".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), SESSION_COOKIE_NAME), None);
    }
}
