//! Serveur HTTP: fichiers statiques, proxy vers le serveur de features, santé

pub mod error;
pub mod proxy;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use reqwest::Client;
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub client: Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "cadastre-web",
    })
}

/// Construit le routeur complet
pub fn router(state: AppState) -> Router {
    let proxy_route = format!("{}/*path", state.config.proxy_prefix);
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health))
        .route(&proxy_route, get(proxy::forward))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Démarre le serveur et bloque jusqu'à son arrêt
pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        port = config.port,
        static_dir = %config.static_dir.display(),
        upstream = %config.upstream_url,
        prefix = %config.proxy_prefix,
        "Démarrage du serveur"
    );

    let app = router(AppState::new(config)?);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {addr}"))?;

    info!("Serveur disponible sur http://localhost:{}", addr.port());
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
