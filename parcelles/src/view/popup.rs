//! Contenu du popup d'une parcelle

use serde::Serialize;

use crate::types::Parcel;

const MISSING: &str = "N/A";

/// Couleur du badge de nature. Table propre au popup: elle diverge de la
/// couleur des formes pour "Abandonné" et "Terrain Nu Clôturé" (gris neutre).
pub fn badge_color(land_use: Option<&str>) -> &'static str {
    match land_use {
        Some("Bâti") => "#2ecc71",
        Some("Non Bâti") => "#f39c12",
        Some("En Construction") => "#e74c3c",
        Some("Inachevé") => "#9b59b6",
        _ => "#95a5a6",
    }
}

/// Données affichées dans le popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub land_use: String,
    pub badge_color: &'static str,
    pub municipality: String,
    pub district: String,
    pub block: String,
    pub lot: String,
}

impl Popup {
    pub fn for_parcel(parcel: &Parcel) -> Self {
        let attrs = &parcel.attributes;
        let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());

        Self {
            title: format!("Parcelle {}", parcel.label()),
            land_use: or_missing(&attrs.land_use),
            badge_color: badge_color(attrs.land_use.as_deref()),
            municipality: or_missing(&attrs.municipality),
            district: or_missing(&attrs.district),
            block: or_missing(&attrs.block),
            lot: or_missing(&attrs.lot),
        }
    }

    /// Lignes (libellé, valeur) dans l'ordre d'affichage
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Commune", self.municipality.as_str()),
            ("Quartier", self.district.as_str()),
            ("Ilot", self.block.as_str()),
            ("Lot", self.lot.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::fallback_collection;
    use crate::types::AttributeKeys;

    #[test]
    fn test_popup_for_fallback_parcel() {
        let parcels = fallback_collection(&AttributeKeys::default()).unwrap();
        let popup = Popup::for_parcel(parcels.get("parcelle_anyama.185").unwrap());

        assert_eq!(popup.title, "Parcelle 185");
        assert_eq!(popup.land_use, "Abandonné");
        assert_eq!(popup.badge_color, "#95a5a6");
        assert_eq!(popup.block, "N/A");
        assert_eq!(popup.fields()[1], ("Quartier", "THOMASSET"));
    }

    #[test]
    fn test_badge_differs_from_shape_colour() {
        use crate::view::style::land_use_color;

        assert_eq!(badge_color(Some("Bâti")), land_use_color(Some("Bâti")));
        assert_eq!(badge_color(Some("Inachevé")), "#9b59b6");
        assert_eq!(badge_color(Some("Abandonné")), "#95a5a6");
        assert_eq!(land_use_color(Some("Abandonné")), "#e67e22");
        assert_eq!(badge_color(Some("Terrain Nu Clôturé")), "#95a5a6");
        assert_eq!(badge_color(None), "#95a5a6");
    }
}
