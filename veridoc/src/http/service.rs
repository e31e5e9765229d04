// SPDX-License-Identifier: AGPL-3.0-or-later

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Result;
use axum::extract::Extension;
use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use http::header::CONTENT_TYPE;
use log::debug;
use tower_http::cors::{Any, CorsLayer};

use crate::bus::ServiceSender;
use crate::context::Context;
use crate::http::api::{
    handle_add_document, handle_admin_page, handle_delete_by_party_two, handle_delete_document,
    handle_edit_by_party_two, handle_get_document, handle_landing, handle_login,
    handle_login_page, handle_search_documents, handle_search_page, handle_verify,
    handle_visits_api, handle_visits_page,
};
use crate::http::context::HttpServiceContext;
use crate::manager::Shutdown;

/// Build HTTP server with the public verification routes and the admin API.
pub fn build_server(http_context: HttpServiceContext) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(false)
        .allow_origin(Any);

    Router::new()
        // Public routes
        .route("/", get(handle_landing))
        .route("/verify/:token", get(handle_verify))
        .route("/login", get(handle_login_page).post(handle_login))
        // Admin routes, gated by an authenticated session
        .route("/admin", get(handle_admin_page))
        .route("/add-document", post(handle_add_document))
        .route("/search", get(handle_search_page))
        .route("/admin/visits", get(handle_visits_page))
        .route("/api/search-documents", post(handle_search_documents))
        .route("/api/get-document/:doc_number", get(handle_get_document))
        .route(
            "/api/delete-document/:doc_number",
            delete(handle_delete_document),
        )
        .route("/api/edit-by-party-two", post(handle_edit_by_party_two))
        .route(
            "/api/delete-by-party-two/:party_two_id",
            delete(handle_delete_by_party_two),
        )
        .route("/api/visits", get(handle_visits_api))
        // Add middlewares
        .layer(cors)
        // Add shared context
        .layer(Extension(http_context))
}

/// Start HTTP server.
pub async fn http_service(context: Context, signal: Shutdown, tx: ServiceSender) -> Result<()> {
    let http_port = context.config.http_port;
    let http_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), http_port);

    let http_context = HttpServiceContext::new(
        context.store.clone(),
        context.sessions.clone(),
        context.config.clone(),
        tx,
    );

    axum::Server::try_bind(&http_address)?
        .serve(build_server(http_context).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            debug!("HTTP service is ready");
            signal.await.ok();
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use http::{header, StatusCode};
    use serde_json::json;

    use crate::test_utils::{http_test_client, test_runner, TestNode};

    #[test]
    fn landing_page_confirms_database_connectivity() {
        test_runner(|node: TestNode| async move {
            let client = http_test_client(&node).await;

            let response = client.get("/").send().await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.text().await.contains("connected to the database"));
        })
    }

    #[test]
    fn anonymous_admin_page_redirects_to_login() {
        test_runner(|node: TestNode| async move {
            let client = http_test_client(&node).await;

            let response = client.get("/admin").send().await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);

            let location = response.headers();
            assert_eq!(
                location.get(header::LOCATION).unwrap().to_str().unwrap(),
                "/login"
            );
        })
    }

    #[test]
    fn login_page_is_public() {
        test_runner(|node: TestNode| async move {
            let client = http_test_client(&node).await;

            let response = client.get("/login").send().await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.text().await.contains("login"));
        })
    }

    #[test]
    fn successful_login_sets_a_session_cookie() {
        test_runner(|node: TestNode| async move {
            let client = http_test_client(&node).await;

            let response = client
                .post("/login")
                .json(&json!({ "username": "admin", "password": "admin" }))
                .send()
                .await;
            assert_eq!(response.status(), StatusCode::OK);

            let headers = response.headers();
            let cookie = headers
                .get(header::SET_COOKIE)
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();

            assert!(cookie.starts_with("session="));
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("SameSite=Lax"));
        })
    }
}
