//! Configuration du serveur et de la source WFS
//!
//! Les valeurs viennent des variables d'environnement (éventuellement via
//! `.env`), les options de la CLI les remplacent.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use parcelles::AttributeKeys;

/// Lit une variable et la convertit, valeur par défaut si absente ou invalide
fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Configuration du serveur statique / proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Répertoire servi à la racine
    pub static_dir: PathBuf,
    /// Hôte du serveur de features (GeoServer)
    pub upstream_url: String,
    /// Préfixe des chemins relayés vers `upstream_url`
    pub proxy_prefix: String,
    /// Fichier servi quand le serveur de features est injoignable
    pub fallback_file: PathBuf,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(&lookup, "PORT", 8000),
            static_dir: PathBuf::from(string_or(&lookup, "STATIC_DIR", ".")),
            upstream_url: string_or(&lookup, "UPSTREAM_URL", "http://localhost:8080"),
            proxy_prefix: normalize_prefix(&string_or(&lookup, "PROXY_PREFIX", "/geoserver")),
            fallback_file: PathBuf::from(string_or(&lookup, "FALLBACK_FILE", "data.json")),
            upstream_timeout: Duration::from_secs(parse_or(&lookup, "UPSTREAM_TIMEOUT_SECS", 60)),
        }
    }
}

/// Préfixe de la forme `/geoserver` (slash initial, sans slash final)
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    format!("/{trimmed}")
}

/// Configuration de la source WFS consommée par le chargeur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfsConfig {
    pub base_url: String,
    pub path: String,
    pub type_name: String,
    pub srs_name: String,
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl WfsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: string_or(&lookup, "WFS_BASE_URL", "http://localhost:8000"),
            path: string_or(&lookup, "WFS_PATH", "/geoserver/Projet_Rokia/ows"),
            type_name: string_or(&lookup, "WFS_TYPE_NAME", "Projet_Rokia:parcelle_anyama"),
            srs_name: string_or(&lookup, "WFS_SRS_NAME", "EPSG:404000"),
            batch_size: parse_or(&lookup, "WFS_BATCH_SIZE", parcelles::DEFAULT_PAGE_SIZE).max(1),
            timeout: Duration::from_secs(parse_or(&lookup, "WFS_TIMEOUT_SECS", 60)),
        }
    }

    /// URL complète du service (sans paramètres)
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Charge la correspondance des attributs depuis un fichier JSON.
///
/// Les clés absentes du fichier gardent leur valeur par défaut.
pub fn load_keys(path: &Path) -> Result<AttributeKeys> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read attribute keys file: {}", path.display()))?;

    serde_json::from_str(&content).context("Failed to parse attribute keys JSON")
}
