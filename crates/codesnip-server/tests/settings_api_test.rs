//! Settings and assist endpoints.

mod common;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use codesnip_core::models::settings::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use serde_json::{Value, json};

use common::{ADMIN, EDITOR, rpc, state, state_with_base};

const KEY: &str = "sk-proj_ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

#[tokio::test]
async fn defaults_are_installed() {
    let state = state();
    let (status, body) = rpc(&state, ADMIN, "get_settings", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "api_key": "", "model": DEFAULT_MODEL, "max_tokens": DEFAULT_MAX_TOKENS })
    );
}

#[tokio::test]
async fn save_then_read_back() {
    let state = state();
    let (status, body) = rpc(
        &state,
        ADMIN,
        "save_settings",
        json!({ "api_key": KEY, "model": "gpt-4o", "max_tokens": "2000" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Settings saved successfully!");
    assert_eq!(body["data"]["max_tokens"], 2000);

    let (_, body) = rpc(&state, ADMIN, "get_settings", json!({})).await;
    assert_eq!(
        body["data"],
        json!({ "api_key": KEY, "model": "gpt-4o", "max_tokens": 2000 })
    );
}

#[tokio::test]
async fn settings_require_manage_options() {
    let state = state();
    for method in ["get_settings", "save_settings"] {
        let (status, body) = rpc(&state, EDITOR, method, json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Insufficient permissions");
    }
}

#[tokio::test]
async fn invalid_settings_are_rejected_and_not_stored() {
    let state = state();
    let cases = [
        (json!({ "api_key": "", "model": "gpt-4o", "max_tokens": 10 }), "API key is required"),
        (json!({ "api_key": "0123456789", "model": "gpt-4o", "max_tokens": 10 }), "Invalid API key format"),
        (json!({ "api_key": KEY, "model": "", "max_tokens": 10 }), "Model is required"),
        (json!({ "api_key": KEY, "model": "gpt-5-ultra", "max_tokens": 10 }), "Invalid model selection"),
        (json!({ "api_key": KEY, "model": "gpt-4o", "max_tokens": 5000 }), "Max tokens must be between 1 and 4000"),
        (json!({ "api_key": KEY, "model": "gpt-4o", "max_tokens": "lots" }), "Max tokens must be between 1 and 4000"),
    ];
    for (payload, message) in cases {
        let (status, body) = rpc(&state, ADMIN, "save_settings", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }

    let (_, body) = rpc(&state, ADMIN, "get_settings", json!({})).await;
    assert_eq!(body["data"]["api_key"], "");
}

#[tokio::test]
async fn assist_validation() {
    let state = state();

    let (status, body) = rpc(&state, EDITOR, "assist", json!({ "prompt": " ", "snippet": "<p>x</p>" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!({ "prompt": "Prompt must required" }));

    let long = "a".repeat(10_001);
    let (status, body) = rpc(&state, EDITOR, "assist", json!({ "prompt": long, "snippet": "<p>x</p>" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!({ "prompt": "Invalid prompt or max length 10000 characters" })
    );

    let (status, body) = rpc(&state, EDITOR, "assist", json!({ "prompt": "make it blue", "snippet": "" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!({ "prompt": "Code snippet must required" }));

    let (status, body) = rpc(
        &state,
        EDITOR,
        "assist",
        json!({ "prompt": "make it blue", "snippet": "<form></form>" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        json!({ "snippet": "The <form> tag is not allowed in snippets." })
    );
}

#[tokio::test]
async fn assist_without_key_is_a_config_error() {
    let state = state();
    let (status, body) = rpc(
        &state,
        EDITOR,
        "assist",
        json!({ "prompt": "make it blue", "snippet": "<p>x</p>" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!({ "prompt": "OpenAI API key not configured. Please configure it in Settings." })
    );
}

async fn provider(reply: Value, status: StatusCode) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let reply = reply.clone();
            async move { (status, Json(reply)) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

#[tokio::test]
async fn assist_returns_filtered_suggestion() {
    let base = provider(
        json!({ "choices": [{ "message": { "role": "assistant",
            "content": "<div style=\"color:blue\">x</div><script>alert(1)</script>" } }] }),
        StatusCode::OK,
    )
    .await;
    let state = state_with_base(&base);
    rpc(
        &state,
        ADMIN,
        "save_settings",
        json!({ "api_key": KEY, "model": "gpt-4o-mini", "max_tokens": 300 }),
    )
    .await;

    let (status, body) = rpc(
        &state,
        EDITOR,
        "assist",
        json!({ "prompt": "make it blue", "snippet": "<div>x</div>" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully!");
    let suggestion = body["data"].as_str().unwrap();
    assert!(suggestion.starts_with("<div style=\"color:blue\">x</div>"));
    assert!(!suggestion.contains("<script"));
}

#[tokio::test]
async fn assist_surfaces_provider_errors() {
    let base = provider(
        json!({ "error": { "message": "Incorrect API key provided." } }),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    let state = state_with_base(&base);
    rpc(
        &state,
        ADMIN,
        "save_settings",
        json!({ "api_key": KEY, "model": "gpt-4o-mini", "max_tokens": 300 }),
    )
    .await;

    let (status, body) = rpc(
        &state,
        EDITOR,
        "assist",
        json!({ "prompt": "make it blue", "snippet": "<div>x</div>" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!({ "prompt": "Incorrect API key provided." }));
}
