//! Surfaces de rendu hors navigateur

pub mod geojson;

pub use self::geojson::GeoJsonMap;
