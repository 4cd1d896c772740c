//! Source WFS via reqwest
//!
//! Ne gère que le transport: construction de la requête GetFeature, timeout,
//! correspondance des statuts HTTP vers `LoadError`. Le décodage est fait par
//! le chargeur.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use parcelles::{FeatureRequest, FeatureSource, LoadError};

use crate::config::WfsConfig;

pub const DEFAULT_USER_AGENT: &str = concat!("cadastre-web/", env!("CARGO_PKG_VERSION"));

/// Source de parcelles servie par un GeoServer (WFS 1.0.0, sortie GeoJSON)
pub struct WfsHttpSource {
    client: Client,
    endpoint: String,
    type_name: String,
    srs_name: String,
}

impl WfsHttpSource {
    /// # Errors
    ///
    /// Le client reqwest ne peut pas être construit.
    pub fn new(config: &WfsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            type_name: config.type_name.clone(),
            srs_name: config.srs_name.clone(),
        })
    }

    /// Paramètres GetFeature pour une requête (complète ou une page)
    pub fn query(&self, request: FeatureRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("service", "WFS".to_string()),
            ("version", "1.0.0".to_string()),
            ("request", "GetFeature".to_string()),
            ("typeName", self.type_name.clone()),
            ("outputFormat", "application/json".to_string()),
            ("srsName", self.srs_name.clone()),
        ];
        if let Some(page) = request.page {
            params.push(("maxFeatures", page.max_features.to_string()));
            params.push(("startIndex", page.start_index.to_string()));
        }
        params
    }
}

#[async_trait]
impl FeatureSource for WfsHttpSource {
    async fn fetch(&self, request: FeatureRequest) -> Result<Bytes, LoadError> {
        debug!(endpoint = %self.endpoint, ?request, "Requête WFS");

        let response = self
            .client
            .get(&self.endpoint)
            .header(USER_AGENT, DEFAULT_USER_AGENT)
            .header(ACCEPT, "application/json")
            .query(&self.query(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        response.bytes().await.map_err(map_transport_error)
    }

    fn describe(&self) -> String {
        format!("WFS {} ({})", self.endpoint, self.type_name)
    }
}

fn map_transport_error(error: reqwest::Error) -> LoadError {
    if error.is_timeout() {
        LoadError::timeout(error.to_string())
    } else {
        LoadError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> LoadError {
    LoadError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}
