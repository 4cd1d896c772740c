//! Définition et implémentation des commandes CLI
//!
//! - `serve`: fichiers statiques + proxy vers le serveur de features
//! - `view`: chargement, filtrage et export GeoJSON de la couche affichée
//! - `options`: valeurs disponibles pour chaque filtre

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use parcelles::view::notify::Level;
use parcelles::{
    AttributeKeys, Dimension, FeatureSource, FilterOptions, LoadOrigin, Loader, ViewController,
};

use crate::config::{load_keys, ServerConfig, WfsConfig};
use crate::console::ConsoleView;
use crate::export::GeoJsonMap;
use crate::http_source::WfsHttpSource;
use crate::report::{ViewReport, ViewStatus};
use crate::server;

#[derive(Subcommand)]
pub enum Commands {
    /// Serve static files and proxy feature-server requests
    Serve(ServeArgs),

    /// Load parcels, apply filters and export the displayed layer to GeoJSON
    View(ViewArgs),

    /// Print the selectable values of each filter
    Options(SourceArgs),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port d'écoute (défaut : env PORT / 8000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Répertoire des fichiers statiques (défaut : env STATIC_DIR / .)
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// URL du serveur de features (défaut : env UPSTREAM_URL / http://localhost:8080)
    #[arg(long)]
    pub upstream: Option<String>,

    /// Préfixe relayé (défaut : env PROXY_PREFIX / /geoserver)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Fichier servi si le serveur de features est injoignable (défaut : env FALLBACK_FILE / data.json)
    #[arg(long)]
    pub fallback: Option<PathBuf>,
}

impl ServeArgs {
    /// Applique les options sur la configuration d'environnement
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = dir;
        }
        if let Some(upstream) = self.upstream {
            config.upstream_url = upstream;
        }
        if let Some(prefix) = self.prefix {
            config.proxy_prefix = crate::config::normalize_prefix(&prefix);
        }
        if let Some(fallback) = self.fallback {
            config.fallback_file = fallback;
        }
        config
    }
}

#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// URL de base du service WFS (défaut : env WFS_BASE_URL / http://localhost:8000)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Taille des lots en cas de chargement par lots (défaut : env WFS_BATCH_SIZE / 1000)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Fichier JSON de correspondance des attributs
    #[arg(long)]
    pub keys: Option<PathBuf>,
}

impl SourceArgs {
    pub fn apply(&self, mut config: WfsConfig) -> WfsConfig {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size.max(1);
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Quartier sélectionné
    #[arg(long)]
    pub district: Option<String>,

    /// Ilot sélectionné
    #[arg(long)]
    pub block: Option<String>,

    /// Lot sélectionné
    #[arg(long)]
    pub lot: Option<String>,

    /// Fichier GeoJSON de sortie
    #[arg(short, long, default_value = "parcelles.geojson")]
    pub output: PathBuf,

    /// Rapport JSON (optionnel)
    #[arg(long)]
    pub report: Option<PathBuf>,
}

fn build_loader(args: &SourceArgs) -> Result<Loader<WfsHttpSource>> {
    let config = args.apply(WfsConfig::from_env());
    let keys = match &args.keys {
        Some(path) => load_keys(path)?,
        None => AttributeKeys::default(),
    };
    let source = WfsHttpSource::new(&config).context("Failed to build WFS client")?;

    Ok(Loader::new(source)
        .with_page_size(config.batch_size)
        .with_keys(keys))
}

/// Exécute la commande serve
pub async fn cmd_serve(args: ServeArgs) -> Result<()> {
    let config = args.apply(ServerConfig::from_env());
    server::serve(config).await
}

/// Exécute la commande view
pub async fn cmd_view(args: ViewArgs) -> Result<()> {
    let loader = build_loader(&args.source)?;
    run_view(&loader, &args).await
}

/// Pipeline complet sur un chargeur donné: chargement, sélections successives,
/// export de la couche et rapport
pub async fn run_view<S: FeatureSource>(loader: &Loader<S>, args: &ViewArgs) -> Result<()> {
    let start = Instant::now();
    let mut report = ViewReport::new(&loader.source().describe());
    let mut controller = ViewController::new(GeoJsonMap::default(), ConsoleView::default());

    report.origin = controller.reload(loader).await.ok();

    let selections = [
        (Dimension::District, &args.district),
        (Dimension::Block, &args.block),
        (Dimension::Lot, &args.lot),
    ];
    for (dimension, value) in selections {
        if let Some(value) = value {
            controller.on_selection_change(dimension, value);
        }
    }

    ensure_parent_dir(&args.output)?;
    controller.map().write(&args.output)?;
    report.output = Some(args.output.display().to_string());

    for notification in controller.notifications() {
        report.record_notification(notification);
    }
    report.state = Some(controller.state().summary());
    report.set_duration(start.elapsed());
    report.finalize();
    report.display();

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Rapport sauvegardé");
    }

    if report.status == ViewStatus::Failed {
        let reason = report
            .messages
            .iter()
            .find(|m| m.level == Level::Error)
            .map_or("unknown error", |m| m.message.as_str());
        anyhow::bail!("Loading parcels failed: {reason}");
    }

    info!("{}", report.summary());
    Ok(())
}

/// Exécute la commande options
pub async fn cmd_options(args: SourceArgs) -> Result<()> {
    let loader = build_loader(&args)?;
    let outcome = loader.load().await.context("Failed to load parcels")?;
    match (&outcome.warning, outcome.origin) {
        (Some(warning), LoadOrigin::Batched { pages }) => {
            warn!(error = %warning, pages, "Parcelles chargées par lots")
        }
        (Some(warning), _) => warn!(error = %warning, "Données de démonstration utilisées"),
        (None, _) => {}
    }

    let options = FilterOptions::derive(&outcome.collection);
    for dimension in Dimension::ALL {
        let values = options.get(dimension);
        println!("{} ({}): {}", dimension, values.len(), values.join(", "));
    }
    Ok(())
}

/// Crée le répertoire parent d'un fichier de sortie
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}
