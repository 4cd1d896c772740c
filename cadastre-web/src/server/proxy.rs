//! Relais des requêtes vers le serveur de features
//!
//! Le statut et le corps de la réponse amont sont transmis tels quels; si le
//! serveur est injoignable, le fichier de repli est servi à la place.

use std::path::Path;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::{error, info, warn};

use super::error::ProxyError;
use super::AppState;
use crate::http_source::DEFAULT_USER_AGENT;

const JSON: &str = "application/json";

pub async fn forward(State(state): State<AppState>, uri: Uri) -> Response {
    let path_and_query = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let target = format!(
        "{}{}",
        state.config.upstream_url.trim_end_matches('/'),
        path_and_query
    );
    info!(%target, "Proxification de la requête");

    match fetch_upstream(&state.client, &target).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "Serveur de features injoignable, utilisation du fichier de repli");
            match read_fallback(&state.config.fallback_file).await {
                Ok(response) => response,
                Err(err) => {
                    error!(error = %err, path = %state.config.fallback_file.display(), "Fichier de repli illisible");
                    err.into_response()
                }
            }
        }
    }
}

async fn fetch_upstream(client: &Client, target: &str) -> Result<Response, ProxyError> {
    let upstream = client
        .get(target)
        .header(USER_AGENT, DEFAULT_USER_AGENT)
        .header(ACCEPT, JSON)
        .send()
        .await?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(JSON)
        .to_string();
    let body = upstream.bytes().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Réponse d'erreur du serveur de features relayée");
    }

    Ok((status, [(CONTENT_TYPE, content_type)], body).into_response())
}

/// Sert le fichier de repli en JSON
pub async fn read_fallback(path: &Path) -> Result<Response, ProxyError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| ProxyError::FallbackUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(([(CONTENT_TYPE, JSON)], data).into_response())
}
