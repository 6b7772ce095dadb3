//! Public rendering, the admin page and health.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use codesnip_server::middleware::auth::USER_HEADER;
use serde_json::json;

use common::{EDITOR, rpc, send_json, send_text, state};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn render(content: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/render")
        .header("content-type", "text/plain")
        .body(Body::from(content.to_string()))
        .unwrap()
}

#[tokio::test]
async fn embed_follows_status() {
    let state = state();
    rpc(&state, EDITOR, "save", json!({ "title": "Banner", "snippet": "<div class=\"b\">Hi</div>" })).await;

    let (status, html) = send_text(&state, get("/embed/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html, "<div class=\"b\">Hi</div>");

    rpc(&state, EDITOR, "toggle_status", json!({ "snippet_id": 1, "status": 0 })).await;
    let (_, html) = send_text(&state, get("/embed/1")).await;
    assert_eq!(html, "");

    rpc(&state, EDITOR, "toggle_status", json!({ "snippet_id": 1, "status": 1 })).await;
    let (_, html) = send_text(&state, get("/embed/1")).await;
    assert_eq!(html, "<div class=\"b\">Hi</div>");
}

#[tokio::test]
async fn embed_of_unknown_id_says_so() {
    let state = state();
    for uri in ["/embed/99", "/embed/abc"] {
        let (status, html) = send_text(&state, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(html, "Snippet not found.");
    }
}

#[tokio::test]
async fn render_expands_every_token() {
    let state = state();
    rpc(&state, EDITOR, "save", json!({ "title": "A", "snippet": "<b>a</b>" })).await;

    let (status, html) = send_text(
        &state,
        render(r#"<p>[codesnip id="1"]</p><p>[codesnip id=1]</p><p>[codesnip]</p>"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        html,
        "<p><b>a</b></p><p><b>a</b></p><p>Snippet not found.</p>"
    );
}

#[tokio::test]
async fn admin_page_needs_a_caller() {
    let state = state();

    let (status, _) = send_text(&state, get("/admin")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/admin")
        .header(USER_HEADER, EDITOR)
        .body(Body::empty())
        .unwrap();
    let (status, html) = send_text(&state, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(&format!(r#"data-nonce="{}""#, common::token(&state, EDITOR))));
    assert!(html.contains(r#"data-can-manage="false""#));
    assert!(!html.contains("view-settings"));
}

#[tokio::test]
async fn health_is_public() {
    let state = state();
    let (status, body) = send_json(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
