mod auth;
mod config;
mod db;
mod forms;
mod gate;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::auth::HttpAuthProvider;
use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let config = AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    let auth = HttpAuthProvider::new(&config.auth_base_url, config.auth_timeouts).expect("auth client init failed");
    tracing::info!(
        auth_base_url = %config.auth_base_url,
        failure_policy = ?config.gate.failure_policy,
        verify_timeout = ?config.gate.verify_timeout,
        "auth service configured"
    );

    let state = state::AppState::new(pool, Arc::new(auth), config.gate);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "orgdesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
