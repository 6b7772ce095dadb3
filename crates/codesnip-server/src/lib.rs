//! HTTP surface of the snippet manager: the admin RPC endpoints, the admin
//! page, and the public embed renderer.

pub mod admin;
pub mod config;
pub mod embed;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// The full route table.
///
/// `/rpc/*` and `/admin` require a caller; embed rendering and health are
/// public.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/rpc/assist", post(routes::assist::assist))
        .route("/rpc/save", post(routes::snippets::save))
        .route("/rpc/get_all", post(routes::snippets::get_all))
        .route("/rpc/get_by_id", post(routes::snippets::get_by_id))
        .route("/rpc/update", post(routes::snippets::update))
        .route("/rpc/toggle_status", post(routes::snippets::toggle_status))
        .route("/rpc/delete", post(routes::snippets::delete))
        .route("/rpc/save_settings", post(routes::settings::save_settings))
        .route("/rpc/get_settings", post(routes::settings::get_settings))
        .route("/admin", get(routes::admin::admin_page))
        .route_layer(from_fn(middleware::auth::require_caller));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/embed/{id}", get(routes::embed::embed_snippet))
        .route("/render", post(routes::embed::render_content))
        .layer(cors);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(admin)
        .merge(public)
        .layer(from_fn(middleware::audit::audit_log))
        .with_state(state)
}
