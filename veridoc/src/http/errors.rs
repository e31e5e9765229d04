// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use crate::db::errors::{DocumentStorageError, VisitStorageError};

/// Errors returned by the HTTP handlers, mapped onto structured JSON error responses.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// The addressed document does not exist.
    #[error("not found")]
    NotFound,

    /// The request lacks a live admin session.
    #[error("authentication required")]
    Unauthorized,

    /// Storage or other internal failure. The detail only goes to the server log, clients
    /// receive a generic message.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl From<DocumentStorageError> for ApiError {
    fn from(error: DocumentStorageError) -> Self {
        Self::Upstream(error.into())
    }
}

impl From<VisitStorageError> for ApiError {
    fn from(error: VisitStorageError) -> Self {
        Self::Upstream(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "authentication required".to_string(),
            ),
            ApiError::Upstream(error) => {
                error!("Internal error while handling HTTP request: {:#}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
