//! Carte « headless »: la couche rendue est exportée en GeoJSON (WGS84)

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Rect;
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject};
use tracing::{debug, info};

use parcelles::view::style::ShapeStyle;
use parcelles::view::viewport::FitOptions;
use parcelles::{MapSurface, RenderedFeature};

/// Surface cartographique qui garde en mémoire la dernière couche et le dernier cadrage
#[derive(Debug, Default)]
pub struct GeoJsonMap {
    features: Vec<RenderedFeature>,
    viewport: Option<(Rect<f64>, FitOptions)>,
    styles: HashMap<String, ShapeStyle>,
}

impl MapSurface for GeoJsonMap {
    fn clear_layer(&mut self) {
        self.features.clear();
        self.styles.clear();
    }

    fn render_layer(&mut self, features: Vec<RenderedFeature>) {
        debug!(count = features.len(), "Couche rendue");
        self.features = features;
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitOptions) {
        debug!(?bounds, ?options, "Cadrage");
        self.viewport = Some((bounds, options));
    }

    fn set_shape_style(&mut self, id: &str, style: ShapeStyle) {
        self.styles.insert(id.to_string(), style);
    }
}

impl GeoJsonMap {
    pub fn features(&self) -> &[RenderedFeature] {
        &self.features
    }

    /// Style courant d'une forme (mise en évidence comprise)
    pub fn style_of(&self, feature: &RenderedFeature) -> ShapeStyle {
        self.styles.get(&feature.id).copied().unwrap_or(feature.style)
    }

    /// Couche courante sous forme de FeatureCollection.
    ///
    /// Chaque feature porte ses propriétés d'origine plus `style` et `popup`;
    /// la collection porte l'emprise (`bbox`) et la contrainte de cadrage
    /// (`viewport`).
    pub fn to_feature_collection(&self) -> Result<FeatureCollection> {
        let features = self
            .features
            .iter()
            .map(|rendered| self.to_feature(rendered))
            .collect::<Result<Vec<_>>>()?;

        let (bbox, foreign_members) = match self.viewport {
            Some((rect, options)) => {
                let mut members = JsonObject::new();
                members.insert("viewport".to_string(), serde_json::to_value(options)?);
                (
                    Some(vec![rect.min().x, rect.min().y, rect.max().x, rect.max().y]),
                    Some(members),
                )
            }
            None => (None, None),
        };

        Ok(FeatureCollection {
            bbox,
            features,
            foreign_members,
        })
    }

    fn to_feature(&self, rendered: &RenderedFeature) -> Result<Feature> {
        let mut properties = rendered.properties.clone();
        properties.insert("style".to_string(), serde_json::to_value(self.style_of(rendered))?);
        properties.insert("popup".to_string(), serde_json::to_value(&rendered.popup)?);

        Ok(Feature {
            bbox: None,
            geometry: rendered.geometry.clone().map(Geometry::new),
            id: Some(Id::String(rendered.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        })
    }

    /// Écrit la couche courante dans un fichier GeoJSON
    pub fn write(&self, output_path: &Path) -> Result<()> {
        let collection = self.to_feature_collection()?;

        let file = File::create(output_path)
            .context(format!("Failed to create file: {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &collection)?;
        writer.flush()?;

        info!(
            path = %output_path.display(),
            features = self.features.len(),
            "Couche exportée en GeoJSON"
        );
        Ok(())
    }
}
