use codesnip_auth::NonceSigner;
use codesnip_openai::client::build_client;
use codesnip_server::config::ServerConfig;
use codesnip_server::state::AppState;
use codesnip_server::{admin, build_router};
use codesnip_storage::db;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = ServerConfig::from_env()?;

    let mut conn = db::open(&config.db_path)?;
    db::init(&mut conn)?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    let nonces = match &config.nonce_secret {
        Some(secret) => NonceSigner::new(secret)?,
        None => {
            tracing::warn!("CODESNIP_NONCE_SECRET not set, admin tokens will not survive a restart");
            NonceSigner::random()?
        }
    };

    let http = build_client(config.openai_timeout)?;
    let templates = admin::templates()?;
    let state = AppState::new(conn, http, config.openai_base_url.as_str(), nonces, templates);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
