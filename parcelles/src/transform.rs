//! Conversion approchée des coordonnées projetées vers longitude/latitude
//!
//! Les parcelles sont servies dans un système projeté local (type UTM 30N).
//! La conversion est un simple décalage linéaire autour du point de référence
//! d'Anyama: elle n'est valable que sur l'emprise réduite de la commune et les
//! constantes ne doivent pas changer (placement identique côté carte).
//!
//! ```text
//! lat = REF_LAT + (easting  - AVG_EASTING)  * SCALE
//! lng = REF_LNG + (northing - AVG_NORTHING) * SCALE
//! ```

use geojson::{PolygonType, Position, Value};
use tracing::debug;

/// Approximation linéaire locale projeté → géographique
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalApproximation {
    /// Latitude du point de référence (degrés)
    pub ref_lat: f64,
    /// Longitude du point de référence (degrés)
    pub ref_lng: f64,
    /// Easting moyen des données
    pub avg_easting: f64,
    /// Northing moyen des données
    pub avg_northing: f64,
    /// Facteur d'échelle empirique (degrés par mètre)
    pub scale: f64,
}

impl LocalApproximation {
    /// Paramètres d'Anyama, Côte d'Ivoire
    pub const ANYAMA: Self = Self {
        ref_lat: 5.4958,
        ref_lng: -4.0519,
        avg_easting: 385000.0,
        avg_northing: 610000.0,
        scale: 0.00001,
    };

    /// Convertit (easting, northing) en (lng, lat)
    pub fn to_lng_lat(&self, easting: f64, northing: f64) -> (f64, f64) {
        let lat = self.ref_lat + (easting - self.avg_easting) * self.scale;
        let lng = self.ref_lng + (northing - self.avg_northing) * self.scale;
        (lng, lat)
    }

    /// Transforme une position; l'élévation éventuelle est conservée.
    /// Une position à moins de 2 composantes est rendue telle quelle.
    pub fn transform_position(&self, position: &[f64]) -> Position {
        match position {
            [easting, northing, rest @ ..] => {
                let (lng, lat) = self.to_lng_lat(*easting, *northing);
                let mut out = Vec::with_capacity(position.len());
                out.push(lng);
                out.push(lat);
                out.extend_from_slice(rest);
                out
            }
            _ => position.to_vec(),
        }
    }

    fn transform_polygon(&self, polygon: &PolygonType) -> PolygonType {
        polygon
            .iter()
            .map(|ring| ring.iter().map(|p| self.transform_position(p)).collect())
            .collect()
    }

    /// Transforme une géométrie.
    ///
    /// Seuls `Polygon` et `MultiPolygon` sont convertis; les autres types sont
    /// rendus inchangés (non supportés).
    pub fn transform_geometry(&self, value: &Value) -> Value {
        match value {
            Value::Polygon(polygon) => Value::Polygon(self.transform_polygon(polygon)),
            Value::MultiPolygon(polygons) => Value::MultiPolygon(
                polygons.iter().map(|p| self.transform_polygon(p)).collect(),
            ),
            other => {
                debug!(geometry_type = geometry_type(other), "Géométrie non convertie");
                other.clone()
            }
        }
    }
}

/// Nom GeoJSON du type de géométrie
pub fn geometry_type(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

impl Default for LocalApproximation {
    fn default() -> Self {
        Self::ANYAMA
    }
}
