#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use codesnip_auth::{NONCE_ACTION, NonceSigner};
use codesnip_openai::client::build_client;
use codesnip_server::middleware::auth::{CAPABILITIES_HEADER, USER_HEADER};
use codesnip_server::routes::NONCE_HEADER;
use codesnip_server::state::AppState;
use codesnip_server::{admin, build_router};
use codesnip_storage::db;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN: &str = "admin";
pub const EDITOR: &str = "editor";

pub fn state_with_base(base_url: &str) -> AppState {
    let mut conn = db::open_in_memory().unwrap();
    db::init(&mut conn).unwrap();
    AppState::new(
        conn,
        build_client(Duration::from_secs(5)).unwrap(),
        base_url,
        NonceSigner::new("integration-secret").unwrap(),
        admin::templates().unwrap(),
    )
}

pub fn state() -> AppState {
    state_with_base("http://127.0.0.1:9/v1")
}

pub fn token(state: &AppState, user: &str) -> String {
    state.nonces.issue(NONCE_ACTION, user)
}

/// A signed RPC call from `user`. Only `admin` holds `manage_options`.
pub fn rpc_request(state: &AppState, user: &str, method: &str, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/rpc/{method}"))
        .header("content-type", "application/json")
        .header(USER_HEADER, user)
        .header(NONCE_HEADER, token(state, user));
    if user == ADMIN {
        builder = builder.header(CAPABILITIES_HEADER, "manage_options");
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

pub async fn send_json(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(state, req).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn rpc(state: &AppState, user: &str, method: &str, body: Value) -> (StatusCode, Value) {
    send_json(state, rpc_request(state, user, method, body)).await
}

pub async fn send_text(state: &AppState, req: Request<Body>) -> (StatusCode, String) {
    let (status, bytes) = send(state, req).await;
    (status, String::from_utf8(bytes).unwrap())
}
