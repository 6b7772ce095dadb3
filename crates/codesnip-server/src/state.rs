use std::sync::Arc;

use codesnip_auth::NonceSigner;
use rusqlite::Connection;
use tera::Tera;
use tokio::sync::Mutex;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    /// Handlers hold the lock only for their own statements, never across
    /// the completion call.
    pub db: Arc<Mutex<Connection>>,
    pub http: reqwest::Client,
    pub openai_base_url: Arc<str>,
    pub nonces: Arc<NonceSigner>,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn new(
        conn: Connection,
        http: reqwest::Client,
        openai_base_url: impl Into<Arc<str>>,
        nonces: NonceSigner,
        templates: Tera,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            http,
            openai_base_url: openai_base_url.into(),
            nonces: Arc::new(nonces),
            templates: Arc::new(templates),
        }
    }
}
