//! Source de features (port) et décodage des FeatureCollection
//!
//! Le transport (HTTP, fichier, mémoire) est injecté via le trait
//! `FeatureSource`; le décodage du corps est commun à toutes les sources.

use async_trait::async_trait;
use bytes::Bytes;
use geojson::{Geometry, JsonObject};
use serde::Deserialize;
use tracing::debug;

use crate::error::LoadError;
use crate::types::{AttributeKeys, Parcel, ParcelAttributes, ParcelCollection};

/// Page demandée lors d'un chargement par lots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Index de la première feature (`startIndex`)
    pub start_index: usize,
    /// Nombre maximal de features (`maxFeatures`)
    pub max_features: usize,
}

/// Requête adressée à la source: collection complète ou une page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureRequest {
    pub page: Option<Page>,
}

impl FeatureRequest {
    /// Collection complète
    pub fn full() -> Self {
        Self { page: None }
    }

    /// Une page de la collection
    pub fn page(start_index: usize, max_features: usize) -> Self {
        Self {
            page: Some(Page {
                start_index,
                max_features,
            }),
        }
    }
}

/// Source distante de features (serveur WFS, fichier, ...)
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Récupère le corps brut (JSON) d'une FeatureCollection.
    ///
    /// Un statut hors 2xx doit être rendu sous la forme `LoadError::Status`.
    async fn fetch(&self, request: FeatureRequest) -> Result<Bytes, LoadError>;

    /// Description pour les logs
    fn describe(&self) -> String {
        "feature source".to_string()
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollectionDto {
    features: Vec<FeatureDto>,
    #[serde(rename = "totalFeatures", default)]
    total_features: Option<serde_json::Value>,
    #[serde(rename = "numberReturned", default)]
    number_returned: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FeatureDto {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<JsonObject>,
}

/// Décode une FeatureCollection en parcelles.
///
/// `offset` est la position de la première feature dans la collection complète
/// (identifiants positionnels des features anonymes).
pub fn decode_collection(
    body: &[u8],
    keys: &AttributeKeys,
    offset: usize,
) -> Result<Vec<Parcel>, LoadError> {
    let dto: FeatureCollectionDto =
        serde_json::from_slice(body).map_err(|e| LoadError::parse(e.to_string()))?;

    debug!(
        total_features = ?dto.total_features,
        number_returned = ?dto.number_returned,
        features = dto.features.len(),
        "FeatureCollection décodée"
    );

    Ok(dto
        .features
        .into_iter()
        .enumerate()
        .map(|(i, feature)| into_parcel(feature, keys, offset + i))
        .collect())
}

fn into_parcel(feature: FeatureDto, keys: &AttributeKeys, index: usize) -> Parcel {
    let properties = feature.properties.unwrap_or_default();
    let id = feature
        .id
        .as_ref()
        .and_then(id_as_string)
        .or_else(|| properties.get("id").and_then(id_as_string))
        .or_else(|| properties.get("gid").and_then(id_as_string))
        .unwrap_or_else(|| format!("parcelle.{}", index));

    Parcel {
        id,
        geometry: feature.geometry.map(|g| g.value),
        attributes: ParcelAttributes::from_properties(&properties, keys),
        properties,
    }
}

fn id_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Décode une collection complète
pub fn decode_parcels(body: &[u8], keys: &AttributeKeys) -> Result<ParcelCollection, LoadError> {
    decode_collection(body, keys, 0).map(ParcelCollection::new)
}
