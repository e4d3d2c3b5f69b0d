//! Test helper utilities for verifier integration tests
//!
//! Hosts a minimal stand-in for the service under test: an axum server
//! answering the stats probe and returning a canned body from the query
//! endpoint, so the full transport → parser → comparator pipeline runs
//! without a live database.
#![allow(dead_code)]

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use verifier::QueryClient;

/// Start a mock query service returning `body` with 200 OK. Returns the
/// `host:port` address to point a [`QueryClient`] at.
pub async fn start_mock_query_service(body: impl Into<String>) -> String {
    start_mock_with_status(StatusCode::OK, body).await
}

/// Start a mock query service answering with an arbitrary status.
pub async fn start_mock_with_status(status: StatusCode, body: impl Into<String>) -> String {
    let body: String = body.into();
    let app = Router::new()
        .route("/api/stats", get(|| async { "{}" }))
        .route(
            "/api/query",
            post(move || {
                let body = body.clone();
                async move { (status, body) }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("127.0.0.1:{}", addr.port())
}

/// Client pointed at a fresh mock service that serves `body`.
pub async fn client_for(body: &str) -> QueryClient {
    let addr = start_mock_query_service(body).await;
    QueryClient::new(&addr).unwrap()
}
