// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, Path};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use log::{debug, error};
use serde::Deserialize;
use serde_json::json;

use crate::bus::ServiceMessage;
use crate::db::types::{Document, DocumentFields, Visit};
use crate::http::context::HttpServiceContext;
use crate::http::errors::ApiError;
use crate::http::session::{AdminSession, SESSION_COOKIE_NAME};
use crate::templates::{
    load_template, render_document, ADMIN_TEMPLATE, INDEX_TEMPLATE, LOGIN_TEMPLATE,
    SEARCH_TEMPLATE, VERIFY_TEMPLATE, VISITS_TEMPLATE,
};
use crate::visits::VisitRecord;

/// Request payload for the admin credential check.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

/// Request payload for creating or updating a document.
///
/// A non-empty `doc_number` addresses an existing document (update), an absent or empty one
/// requests creation with a freshly allocated number. The outer `doc_number` field claims the
/// key during deserialization, the flattened fields never carry one.
#[derive(Debug, Deserialize)]
pub struct AddDocumentRequest {
    #[serde(default)]
    pub doc_number: Option<String>,

    #[serde(flatten)]
    pub fields: DocumentFields,
}

/// Request payload for updating a document addressed by `party_two_id`.
#[derive(Debug, Deserialize)]
pub struct EditByPartyTwoRequest {
    #[serde(default)]
    pub party_two_id: String,

    #[serde(flatten)]
    pub fields: DocumentFields,
}

/// Request payload for the document search.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// Handle requests for the landing page, probing database connectivity.
pub async fn handle_landing(Extension(context): Extension<HttpServiceContext>) -> Response {
    if let Err(err) = context.store.probe().await {
        error!("Database connectivity probe failed: {}", err);
        return service_unavailable();
    }

    match load_template(&context.config.templates_base_path, INDEX_TEMPLATE).await {
        Ok(template) => Html(template).into_response(),
        Err(err) => {
            error!("Could not load landing page template: {:#}", err);
            service_unavailable()
        }
    }
}

fn service_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Service unavailable</h1>".to_string()),
    )
        .into_response()
}

/// Handle requests for the public verification page.
///
/// The token is matched exactly after upper-casing. Every access is published on the bus for the
/// visit logger, including lookups which come back empty.
pub async fn handle_verify(
    Extension(context): Extension<HttpServiceContext>,
    Path(token): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    remote: Option<ConnectInfo<SocketAddr>>,
) -> Result<Response, ApiError> {
    let token = token.trim().to_uppercase();

    let record = VisitRecord::from_request(
        &token,
        &uri.to_string(),
        &headers,
        remote.map(|ConnectInfo(addr)| addr),
    );
    if context.tx.send(ServiceMessage::PageVisited(record)).is_err() {
        debug!("No visit logger subscribed, verification page access not recorded");
    }

    let document = match context.store.get_document_by_token(&token).await? {
        Some(document) => document,
        None => {
            return Ok((
                StatusCode::NOT_FOUND,
                Html(
                    "<h1>Document not found</h1>\
                     <p>The verification link is invalid or the document has been removed.</p>"
                        .to_string(),
                ),
            )
                .into_response())
        }
    };

    let template = load_template(&context.config.templates_base_path, VERIFY_TEMPLATE).await?;
    Ok(Html(render_document(&template, &document)).into_response())
}

/// Handle requests for the admin login page.
pub async fn handle_login_page(
    Extension(context): Extension<HttpServiceContext>,
) -> Result<Html<String>, ApiError> {
    let template = load_template(&context.config.templates_base_path, LOGIN_TEMPLATE).await?;
    Ok(Html(template))
}

/// Handle admin credential checks, establishing a session on success.
pub async fn handle_login(
    Extension(context): Extension<HttpServiceContext>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if request.username != context.config.admin_username
        || request.password != context.config.admin_password
    {
        return Err(ApiError::Unauthorized);
    }

    let session_id = context.sessions.create().await;
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME, session_id, context.config.session_ttl_secs
    );

    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "status": "ok" })),
    )
        .into_response())
}

/// Handle requests for the admin dashboard, redirecting anonymous visitors to the login page.
pub async fn handle_admin_page(
    Extension(context): Extension<HttpServiceContext>,
    session: Option<AdminSession>,
) -> Result<Response, ApiError> {
    if session.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let template = load_template(&context.config.templates_base_path, ADMIN_TEMPLATE).await?;
    Ok(Html(template).into_response())
}

/// Handle document creation and updates submitted from the admin dashboard.
pub async fn handle_add_document(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Json(request): Json<AddDocumentRequest>,
) -> Result<String, ApiError> {
    let doc_number = request
        .doc_number
        .as_deref()
        .map(str::trim)
        .filter(|doc_number| !doc_number.is_empty());

    match doc_number {
        Some(doc_number) => {
            let document = context
                .store
                .update_document_by_number(doc_number, &request.fields)
                .await?
                .ok_or(ApiError::NotFound)?;

            Ok(format!(
                "Document {} updated. Verification token: {}",
                document.doc_number, document.verify_token
            ))
        }
        None => {
            let document = context
                .store
                .insert_document(&request.fields, &context.config.document_number_prefix)
                .await?;

            Ok(format!(
                "Document {} created. Verification token: {}",
                document.doc_number, document.verify_token
            ))
        }
    }
}

/// Handle requests for the admin search page.
pub async fn handle_search_page(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
) -> Result<Html<String>, ApiError> {
    let template = load_template(&context.config.templates_base_path, SEARCH_TEMPLATE).await?;
    Ok(Html(template))
}

/// Handle document searches from the admin UI.
pub async fn handle_search_documents(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = context.store.search_documents(&request.query).await?;
    Ok(Json(documents))
}

/// Handle requests for one document by its number.
pub async fn handle_get_document(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Path(doc_number): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let document = context
        .store
        .get_document_by_number(&doc_number)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(document))
}

/// Handle document deletion by number.
pub async fn handle_delete_document(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Path(doc_number): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !context.store.delete_document_by_number(&doc_number).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "deleted": doc_number })))
}

/// Handle document updates addressed by `party_two_id` instead of the document number.
///
/// On collisions the first match by lowest id is updated.
pub async fn handle_edit_by_party_two(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Json(request): Json<EditByPartyTwoRequest>,
) -> Result<Json<Document>, ApiError> {
    let party_two_id = request.party_two_id.trim();
    if party_two_id.is_empty() {
        return Err(ApiError::Validation(
            "party_two_id must not be empty".to_string(),
        ));
    }

    let document = context
        .store
        .update_document_by_party_two(party_two_id, &request.fields)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(document))
}

/// Handle document deletion addressed by `party_two_id`, removing at most one record.
pub async fn handle_delete_by_party_two(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
    Path(party_two_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !context
        .store
        .delete_document_by_party_two(&party_two_id)
        .await?
    {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "deleted": party_two_id })))
}

/// Handle requests for the visit log page.
pub async fn handle_visits_page(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
) -> Result<Html<String>, ApiError> {
    let template = load_template(&context.config.templates_base_path, VISITS_TEMPLATE).await?;
    Ok(Html(template))
}

/// Handle requests for the visit log, newest entries first.
pub async fn handle_visits_api(
    _session: AdminSession,
    Extension(context): Extension<HttpServiceContext>,
) -> Result<Json<Vec<Visit>>, ApiError> {
    let visits = context.store.get_visits().await?;
    Ok(Json(visits))
}
