//! Types de données pour le crate parcelles

use std::fmt;
use std::sync::Arc;

use geojson::{JsonObject, Value};
use serde::{Deserialize, Serialize};

/// Une parcelle cadastrale avec sa géométrie projetée et ses attributs
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    /// Identifiant unique dans la collection chargée
    pub id: String,

    /// Géométrie en coordonnées projetées (positions à 2 ou 3 composantes)
    pub geometry: Option<Value>,

    /// Attributs normalisés
    pub attributes: ParcelAttributes,

    /// Propriétés brutes de la feature source
    pub properties: JsonObject,
}

impl Parcel {
    /// Libellé affiché dans le popup: propriété `id` si présente, sinon l'identifiant
    pub fn label(&self) -> String {
        self.properties
            .get("id")
            .and_then(property_as_string)
            .unwrap_or_else(|| self.id.clone())
    }

    /// Valeur de l'attribut pour une dimension filtrable
    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::District => self.attributes.district.as_deref(),
            Dimension::Block => self.attributes.block.as_deref(),
            Dimension::Lot => self.attributes.lot.as_deref(),
        }
    }
}

/// Attributs métier d'une parcelle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelAttributes {
    /// Quartier
    pub district: Option<String>,
    /// Ilot
    pub block: Option<String>,
    /// Lot
    pub lot: Option<String>,
    /// Nature du lot (Bâti, Non Bâti, ...)
    pub land_use: Option<String>,
    /// Commune
    pub municipality: Option<String>,
}

impl ParcelAttributes {
    /// Extrait les attributs depuis les propriétés d'une feature
    pub fn from_properties(properties: &JsonObject, keys: &AttributeKeys) -> Self {
        let get = |key: &str| properties.get(key).and_then(property_as_string);
        Self {
            district: get(&keys.district),
            block: get(&keys.block),
            lot: get(&keys.lot),
            land_use: get(&keys.land_use),
            municipality: get(&keys.municipality),
        }
    }
}

/// Convertit une propriété JSON en chaîne (null et chaîne vide → None)
fn property_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Mapping des propriétés source vers les attributs de parcelle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AttributeKeys {
    pub district: String,
    pub block: String,
    pub lot: String,
    pub land_use: String,
    pub municipality: String,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            district: "quartiers".into(),
            block: "ilot".into(),
            lot: "lot".into(),
            land_use: "nature_lot".into(),
            municipality: "commune".into(),
        }
    }
}

/// Séquence ordonnée de parcelles.
///
/// Les parcelles sont partagées (`Arc`) entre la collection complète et les
/// sous-ensembles filtrés: filtrer ne copie ni ne modifie aucune parcelle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelCollection {
    parcels: Vec<Arc<Parcel>>,
}

impl ParcelCollection {
    pub fn new(parcels: Vec<Parcel>) -> Self {
        parcels.into_iter().map(Arc::new).collect()
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Parcel>> {
        self.parcels.iter()
    }

    /// Recherche une parcelle par identifiant
    pub fn get(&self, id: &str) -> Option<&Arc<Parcel>> {
        self.parcels.iter().find(|p| p.id == id)
    }
}

impl FromIterator<Arc<Parcel>> for ParcelCollection {
    fn from_iter<I: IntoIterator<Item = Arc<Parcel>>>(iter: I) -> Self {
        Self {
            parcels: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ParcelCollection {
    type Item = &'a Arc<Parcel>;
    type IntoIter = std::slice::Iter<'a, Arc<Parcel>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parcels.iter()
    }
}

/// Les trois dimensions filtrables, de la plus large à la plus fine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    District,
    Block,
    Lot,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::District, Dimension::Block, Dimension::Lot];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::District => "quartier",
            Dimension::Block => "ilot",
            Dimension::Lot => "lot",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quartier" | "quartiers" | "district" => Ok(Dimension::District),
            "ilot" | "block" => Ok(Dimension::Block),
            "lot" => Ok(Dimension::Lot),
            _ => Err(format!("Invalid dimension: {}. Use: quartier, ilot, lot", s)),
        }
    }
}

/// Sélection courante sur les trois dimensions (None = pas de contrainte)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub district: Option<String>,
    pub block: Option<String>,
    pub lot: Option<String>,
}

impl FilterSelection {
    /// Valeur sélectionnée pour une dimension
    pub fn get(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::District => self.district.as_deref(),
            Dimension::Block => self.block.as_deref(),
            Dimension::Lot => self.lot.as_deref(),
        }
    }

    /// Modifie une dimension; une valeur vide lève la contrainte
    pub fn set(&mut self, dimension: Dimension, value: &str) {
        let value = (!value.is_empty()).then(|| value.to_string());
        match dimension {
            Dimension::District => self.district = value,
            Dimension::Block => self.block = value,
            Dimension::Lot => self.lot = value,
        }
    }

    /// Construit une sélection à partir de la sélection courante
    pub fn with(mut self, dimension: Dimension, value: &str) -> Self {
        self.set(dimension, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.district.is_none() && self.block.is_none() && self.lot.is_none()
    }
}
