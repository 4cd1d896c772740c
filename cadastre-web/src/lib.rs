//! # cadastre-web
//!
//! Serveur et outils autour du pipeline `parcelles` pour la commune d'Anyama.
//!
//! ## Features
//!
//! - Serveur de fichiers statiques avec proxy GeoServer (CORS permissif)
//! - Repli sur un fichier local si GeoServer est injoignable
//! - Source WFS (reqwest) pour le chargeur de parcelles
//! - Export GeoJSON (WGS84) de la couche filtrée, sans navigateur
//!
//! ## Usage CLI
//!
//! ```bash
//! # Serveur statique + proxy
//! cadastre-web serve --port 8000 --upstream http://localhost:8080
//!
//! # Couche filtrée exportée en GeoJSON
//! cadastre-web view --district AHOUABO --block 11 --output ahouabo.geojson
//!
//! # Valeurs disponibles pour chaque filtre
//! cadastre-web options
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod export;
pub mod http_source;
pub mod report;
pub mod server;

pub use config::{ServerConfig, WfsConfig};
pub use http_source::WfsHttpSource;
pub use report::{ViewReport, ViewStatus};
