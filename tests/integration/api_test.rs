//! HTTP surface tests: routing, auth extraction, and the WebSocket
//! upgrade gate.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use recipehub_api::build_router;

use super::helpers::build_stack;

#[tokio::test]
async fn test_health_returns_ok() {
    let stack = build_stack();
    let app = build_router(stack.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["status"], "ok");
}

#[tokio::test]
async fn test_notifications_require_bearer_token() {
    let stack = build_stack();
    let app = build_router(stack.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let stack = build_stack();
    let app = build_router(stack.state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications/unread-count")
                .header("authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn ws_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("host", "localhost")
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_ws_upgrade_rejects_bad_token() {
    let stack = build_stack();
    let app = build_router(stack.state.clone());

    let response = app.oneshot(ws_request("/ws?token=garbage")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_upgrade_accepts_valid_token() {
    let stack = build_stack();
    let app = build_router(stack.state.clone());

    let (token, _) = stack
        .encoder
        .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), "carol")
        .unwrap();

    let response = app
        .oneshot(ws_request(&format!("/ws?token={token}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
}
