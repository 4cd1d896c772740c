//! Erreurs du proxy et leur réponse HTTP

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Serveur de features injoignable
    #[error("Upstream unreachable: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Fichier de repli illisible
    #[error("Impossible de charger les données")]
    FallbackUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Corps JSON des réponses d'erreur
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::FallbackUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_error_body() {
        let err = ProxyError::FallbackUnavailable {
            path: PathBuf::from("data.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Impossible de charger les données");
    }
}
