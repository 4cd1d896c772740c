//! # parcelles
//!
//! Pipeline de visualisation de parcelles cadastrales (commune d'Anyama):
//! chargement WFS, reprojection locale, filtrage quartier / ilot / lot.
//!
//! ## Features
//!
//! - Chargement complet, puis par lots si la réponse est trop lourde ou trop lente
//! - Repli sur une collection de démonstration embarquée
//! - Approximation linéaire locale des coordonnées projetées vers (lng, lat)
//! - Filtrage exact sur trois dimensions, listes de valeurs triées
//! - Contrôleur de vue indépendant de la bibliothèque cartographique
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parcelles::{Loader, ViewController};
//!
//! let loader = Loader::new(source).with_page_size(1000);
//! let mut controller = ViewController::new(map, ui);
//! controller.reload(&loader).await?;
//! controller.on_selection_change(Dimension::District, "AHOUABO");
//! println!("{}", controller.state().filtered().len());
//! ```

pub mod error;
pub mod fallback;
pub mod filter;
pub mod loader;
pub mod source;
pub mod state;
pub mod transform;
pub mod types;
pub mod view;

pub use error::LoadError;
pub use filter::FilterOptions;
pub use loader::{LoadOrigin, LoadOutcome, Loader, DEFAULT_PAGE_SIZE};
pub use source::{FeatureRequest, FeatureSource, Page};
pub use state::{PipelineState, StateSummary};
pub use transform::LocalApproximation;
pub use types::{AttributeKeys, Dimension, FilterSelection, Parcel, ParcelAttributes, ParcelCollection};
pub use view::{MapSurface, RenderedFeature, UiEvent, ViewController, ViewSurface};
