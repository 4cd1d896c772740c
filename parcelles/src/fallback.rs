//! Collection de démonstration embarquée
//!
//! Utilisée quand la source distante est indisponible, pour que la carte
//! reste peuplée et utilisable sans serveur.

use crate::error::LoadError;
use crate::source::decode_parcels;
use crate::types::{AttributeKeys, ParcelCollection};

/// GeoJSON embarqué (trois parcelles d'Anyama)
pub const FALLBACK_GEOJSON: &str = include_str!("../data/fallback.geojson");

/// Décode la collection embarquée
pub fn fallback_collection(keys: &AttributeKeys) -> Result<ParcelCollection, LoadError> {
    decode_parcels(FALLBACK_GEOJSON.as_bytes(), keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_decodes() {
        let parcels = fallback_collection(&AttributeKeys::default()).unwrap();
        assert_eq!(parcels.len(), 3);

        let ids: Vec<&str> = parcels.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["parcelle_anyama.26244", "parcelle_anyama.185", "parcelle_anyama.209"]
        );

        let thomasset = parcels.get("parcelle_anyama.185").unwrap();
        assert_eq!(thomasset.attributes.district.as_deref(), Some("THOMASSET"));
        assert_eq!(thomasset.attributes.block, None);
        assert_eq!(thomasset.attributes.land_use.as_deref(), Some("Abandonné"));
    }
}
