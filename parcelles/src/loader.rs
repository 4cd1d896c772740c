//! Chargement de la collection de parcelles
//!
//! Stratégie:
//! 1. une requête pour la collection complète
//! 2. si l'échec est lié à la taille ou à la durée (timeout, 413, ...):
//!    chargement par lots de `page_size` features, jusqu'à un lot incomplet;
//!    l'échec initial est conservé comme avertissement
//! 3. tout autre échec: repli sur la collection embarquée, l'erreur est
//!    rendue comme avertissement (non fatale)

use tracing::{info, warn};

use crate::error::LoadError;
use crate::fallback::fallback_collection;
use crate::source::{decode_collection, decode_parcels, FeatureRequest, FeatureSource};
use crate::types::{AttributeKeys, ParcelCollection};

/// Taille de lot par défaut
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Provenance de la collection chargée
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LoadOrigin {
    /// Requête unique
    Primary,
    /// Chargement par lots
    Batched { pages: usize },
    /// Données de démonstration embarquées
    Fallback,
}

/// Résultat d'un chargement abouti
#[derive(Debug)]
pub struct LoadOutcome {
    pub collection: ParcelCollection,
    pub origin: LoadOrigin,
    /// Erreur ayant provoqué le chargement par lots ou le repli (non fatale)
    pub warning: Option<LoadError>,
}

/// Chargeur de parcelles au-dessus d'une `FeatureSource`
pub struct Loader<S> {
    source: S,
    page_size: usize,
    keys: AttributeKeys,
}

impl<S: FeatureSource> Loader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
            keys: AttributeKeys::default(),
        }
    }

    /// Taille des lots (minimum 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_keys(mut self, keys: AttributeKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Charge la collection complète.
    ///
    /// # Errors
    ///
    /// Seul l'échec d'un chargement par lots (ou, improbable, du décodage des
    /// données embarquées) est rendu comme erreur.
    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        info!(source = %self.source.describe(), "Chargement de toutes les parcelles");

        let primary = match self.source.fetch(FeatureRequest::full()).await {
            Ok(body) => decode_parcels(&body, &self.keys),
            Err(e) => Err(e),
        };

        match primary {
            Ok(collection) => {
                info!(count = collection.len(), "Parcelles chargées");
                Ok(LoadOutcome {
                    collection,
                    origin: LoadOrigin::Primary,
                    warning: None,
                })
            }
            Err(err) if err.is_transient() => {
                warn!(error = %err, "Échec du chargement complet, tentative par lots");
                let (collection, pages) = self.load_in_batches().await?;
                Ok(LoadOutcome {
                    collection,
                    origin: LoadOrigin::Batched { pages },
                    warning: Some(err),
                })
            }
            Err(err) => {
                warn!(error = %err, "Échec du chargement, utilisation des données de démonstration");
                let collection = fallback_collection(&self.keys)?;
                Ok(LoadOutcome {
                    collection,
                    origin: LoadOrigin::Fallback,
                    warning: Some(err),
                })
            }
        }
    }

    /// Chargement par lots: concatène les pages jusqu'à une page incomplète
    /// ou vide. Retourne la collection et le nombre de requêtes émises.
    ///
    /// # Errors
    ///
    /// Le premier lot en échec interrompt tout le chargement (`LoadError::Batch`).
    pub async fn load_in_batches(&self) -> Result<(ParcelCollection, usize), LoadError> {
        let mut parcels = Vec::new();
        let mut start_index = 0;
        let mut pages = 0;

        loop {
            let request = FeatureRequest::page(start_index, self.page_size);
            pages += 1;
            info!(page = pages, start_index, "Chargement du lot");

            let batch = match self.source.fetch(request).await {
                Ok(body) => decode_collection(&body, &self.keys, start_index),
                Err(e) => Err(e),
            }
            .map_err(|e| LoadError::Batch {
                page: pages,
                source: Box::new(e),
            })?;

            let received = batch.len();
            parcels.extend(batch);
            info!(received, total = parcels.len(), "Lot chargé");

            if received < self.page_size {
                break;
            }
            start_index += self.page_size;
        }

        info!(total = parcels.len(), pages, "Parcelles chargées par lots");
        Ok((ParcelCollection::new(parcels), pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Source en mémoire: la requête complète échoue avec `full_error`,
    /// les pages sont servies depuis `total` features synthétiques.
    struct PagedSource {
        total: usize,
        full_error: Option<fn() -> LoadError>,
        fail_page: Option<usize>,
        requests: Mutex<Vec<FeatureRequest>>,
    }

    impl PagedSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                full_error: None,
                fail_page: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    fn collection_body(range: std::ops::Range<usize>) -> Bytes {
        let features: Vec<String> = range
            .map(|i| {
                format!(
                    r#"{{"type":"Feature","id":"p.{i}","geometry":null,"properties":{{"quartiers":"Q{}","lot":"{i}"}}}}"#,
                    i % 3
                )
            })
            .collect();
        Bytes::from(format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        ))
    }

    #[async_trait]
    impl FeatureSource for PagedSource {
        async fn fetch(&self, request: FeatureRequest) -> Result<Bytes, LoadError> {
            self.requests.lock().unwrap().push(request);
            match request.page {
                None => match self.full_error {
                    Some(make) => Err(make()),
                    None => Ok(collection_body(0..self.total)),
                },
                Some(page) => {
                    if self.fail_page == Some(page.start_index / page.max_features + 1) {
                        return Err(LoadError::transport("connection reset"));
                    }
                    let start = page.start_index.min(self.total);
                    let end = (page.start_index + page.max_features).min(self.total);
                    Ok(collection_body(start..end))
                }
            }
        }
    }

    fn too_large() -> LoadError {
        LoadError::Status {
            status: 413,
            reason: "Payload Too Large".into(),
        }
    }

    fn server_error() -> LoadError {
        LoadError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        }
    }

    #[tokio::test]
    async fn test_primary_load() {
        let loader = Loader::new(PagedSource::new(12));
        let outcome = loader.load().await.unwrap();

        assert_eq!(outcome.origin, LoadOrigin::Primary);
        assert_eq!(outcome.collection.len(), 12);
        assert!(outcome.warning.is_none());
        assert_eq!(loader.source().request_count(), 1);
    }

    #[tokio::test]
    async fn test_batched_termination() {
        let loader = Loader::new(PagedSource::new(3400)).with_page_size(1000);
        let (collection, pages) = loader.load_in_batches().await.unwrap();

        assert_eq!(pages, 4);
        assert_eq!(collection.len(), 3400);
        assert_eq!(loader.source().request_count(), 4);

        let ids: Vec<&str> = collection.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids[0], "p.0");
        assert_eq!(ids[3399], "p.3399");

        let requests = loader.source().requests.lock().unwrap().clone();
        assert_eq!(requests[3], FeatureRequest::page(3000, 1000));
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_on_empty_page() {
        let loader = Loader::new(PagedSource::new(2000)).with_page_size(1000);
        let (collection, pages) = loader.load_in_batches().await.unwrap();

        assert_eq!(pages, 3);
        assert_eq!(collection.len(), 2000);
    }

    #[tokio::test]
    async fn test_transient_failure_switches_to_batches() {
        let mut source = PagedSource::new(2500);
        source.full_error = Some(too_large);
        let loader = Loader::new(source).with_page_size(1000);

        let outcome = loader.load().await.unwrap();
        assert_eq!(outcome.origin, LoadOrigin::Batched { pages: 3 });
        assert_eq!(outcome.collection.len(), 2500);
        assert!(matches!(
            outcome.warning,
            Some(LoadError::Status { status: 413, .. })
        ));
        assert_eq!(loader.source().request_count(), 4);
    }

    #[tokio::test]
    async fn test_batch_failure_aborts() {
        let mut source = PagedSource::new(2500);
        source.full_error = Some(too_large);
        source.fail_page = Some(2);
        let loader = Loader::new(source).with_page_size(1000);

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Batch { page: 2, .. }));
        assert_eq!(loader.source().request_count(), 3);
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let mut source = PagedSource::new(10);
        source.full_error = Some(server_error);
        let loader = Loader::new(source);

        let outcome = loader.load().await.unwrap();
        assert_eq!(outcome.origin, LoadOrigin::Fallback);
        assert_eq!(
            outcome.collection,
            fallback_collection(&AttributeKeys::default()).unwrap()
        );
        assert!(matches!(
            outcome.warning,
            Some(LoadError::Status { status: 500, .. })
        ));
        assert_eq!(loader.source().request_count(), 1);
    }
}
