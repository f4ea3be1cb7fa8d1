//! Common test infrastructure
//!
//! Builds a fully wired in-process app over a temporary SQLite catalog:
//! tests exercise routes through `tower::ServiceExt::oneshot` instead of
//! binding a socket.

mod fixtures;

pub use fixtures::{create_test_catalog, TestApp};

use axum::body::Body;
use axum::Router;
use http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// POST a JSON body, return status and decoded JSON response.
pub async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// GET a path, return status and decoded JSON response.
pub async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
