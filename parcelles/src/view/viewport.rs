//! Cadrage de la carte sur un sous-ensemble de parcelles

use geo::{BoundingRect, Coord, LineString, Rect};
use geojson::Value;
use serde::Serialize;
use tracing::debug;

use crate::transform::geometry_type;
use crate::types::Dimension;

/// Contrainte de cadrage (marge en pixels, zoom maximal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitOptions {
    pub padding_px: u32,
    pub max_zoom: u8,
}

/// Contexte du cadrage: plus la granularité est fine, plus le zoom autorisé est proche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportContext {
    /// Tout le sous-ensemble visible
    WholeSet,
    /// Un quartier sélectionné
    District,
    /// Un ilot sélectionné
    Block,
    /// Un lot sélectionné
    Lot,
}

impl ViewportContext {
    pub fn fit_options(self) -> FitOptions {
        let (padding_px, max_zoom) = match self {
            ViewportContext::WholeSet => (20, 16),
            ViewportContext::District => (15, 15),
            ViewportContext::Block => (12, 17),
            ViewportContext::Lot => (10, 18),
        };
        FitOptions {
            padding_px,
            max_zoom,
        }
    }

    /// Contexte après un changement de sélection sur une dimension
    pub fn for_selection(dimension: Dimension, value: &str) -> Self {
        if value.is_empty() {
            return ViewportContext::WholeSet;
        }
        match dimension {
            Dimension::District => ViewportContext::District,
            Dimension::Block => ViewportContext::Block,
            Dimension::Lot => ViewportContext::Lot,
        }
    }
}

fn push_position(position: &[f64], out: &mut Vec<Coord<f64>>) {
    if let [x, y, ..] = position {
        out.push(Coord { x: *x, y: *y });
    }
}

/// Seules les surfaces (Polygon, MultiPolygon) participent à l'emprise: les
/// autres types ne sont pas reprojetés et resteraient en mètres.
fn collect_coords(value: &Value, out: &mut Vec<Coord<f64>>) {
    match value {
        Value::Polygon(rings) => {
            for p in rings.iter().flatten() {
                push_position(p, out);
            }
        }
        Value::MultiPolygon(polygons) => {
            for p in polygons.iter().flatten().flatten() {
                push_position(p, out);
            }
        }
        other => debug!(
            geometry_type = geometry_type(other),
            "Géométrie ignorée pour le cadrage"
        ),
    }
}

/// Emprise (x = lng, y = lat) des surfaces d'un ensemble de géométries; None si vide
pub fn bounds<'a>(geometries: impl IntoIterator<Item = &'a Value>) -> Option<Rect<f64>> {
    let mut coords = Vec::new();
    for geometry in geometries {
        collect_coords(geometry, &mut coords);
    }
    LineString::new(coords).bounding_rect()
}
