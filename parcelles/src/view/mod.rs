//! Contrôleur de vue: pousse le sous-ensemble visible vers la carte et l'interface
//!
//! La carte et l'interface sont des capacités injectées (`MapSurface`,
//! `ViewSurface`); le contrôleur ne dépend d'aucune bibliothèque de rendu.
//! Tous les événements utilisateur passent par [`ViewController::handle`].

pub mod notify;
pub mod popup;
pub mod style;
pub mod viewport;

use std::time::Instant;

use geo::Rect;
use geojson::{JsonObject, Value};
use tracing::{debug, error, info, warn};

use crate::error::LoadError;
use crate::filter::FilterOptions;
use crate::loader::{LoadOrigin, LoadOutcome, Loader};
use crate::source::FeatureSource;
use crate::state::PipelineState;
use crate::transform::LocalApproximation;
use crate::types::{Dimension, FilterSelection, Parcel};

use notify::{Level, Notification, Notifications};
use popup::Popup;
use style::{style_for_land_use, Interaction, ShapeStyle};
use viewport::{FitOptions, ViewportContext};

/// Forme prête à être dessinée (coordonnées géographiques)
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub id: String,
    /// Géométrie en (lng, lat[, z])
    pub geometry: Option<Value>,
    pub style: ShapeStyle,
    pub popup: Popup,
    pub properties: JsonObject,
}

/// Capacités attendues de la bibliothèque cartographique
pub trait MapSurface {
    /// Retire la couche de parcelles précédente
    fn clear_layer(&mut self);

    /// Dessine une nouvelle couche de parcelles
    fn render_layer(&mut self, features: Vec<RenderedFeature>);

    /// Cadre la carte sur une emprise
    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitOptions);

    /// Change le style d'une forme déjà dessinée
    fn set_shape_style(&mut self, id: &str, style: ShapeStyle);

    /// Emprise d'un ensemble de formes
    fn bounds(&self, features: &[RenderedFeature]) -> Option<Rect<f64>> {
        viewport::bounds(features.iter().filter_map(|f| f.geometry.as_ref()))
    }
}

/// Surface d'interface (listes, compteur, indicateur d'activité, notifications)
pub trait ViewSurface {
    fn show_options(&mut self, options: &FilterOptions);
    fn show_selection(&mut self, selection: &FilterSelection);
    fn show_count(&mut self, label: &str);
    fn show_busy(&mut self, busy: bool);
    fn show_notification(&mut self, notification: &Notification);
    fn hide_notification(&mut self, id: u64);
}

/// Libellé du compteur de parcelles visibles
pub fn count_label(count: usize) -> String {
    format!("{count} parcelles affichées")
}

/// Événement émis par l'interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Une liste déroulante a changé (valeur vide = pas de contrainte)
    SelectionChanged { dimension: Dimension, value: String },
    /// Bouton de réinitialisation
    Reset,
    /// Survol, sortie ou clic sur une forme
    Shape { id: String, interaction: Interaction },
    /// Fermeture d'une notification
    DismissNotification(u64),
}

pub struct ViewController<M, U> {
    map: M,
    ui: U,
    state: PipelineState,
    transform: LocalApproximation,
    notifications: Notifications,
    loading: bool,
}

impl<M: MapSurface, U: ViewSurface> ViewController<M, U> {
    pub fn new(map: M, ui: U) -> Self {
        Self {
            map,
            ui,
            state: PipelineState::default(),
            transform: LocalApproximation::default(),
            notifications: Notifications::new(),
            loading: false,
        }
    }

    /// Recharge la collection complète.
    ///
    /// `&mut self` interdit deux chargements simultanés sur un même contrôleur.
    ///
    /// # Errors
    ///
    /// Échec du chargement par lots; il est aussi notifié à l'utilisateur et
    /// l'état précédent est conservé.
    pub async fn reload<S: FeatureSource>(
        &mut self,
        loader: &Loader<S>,
    ) -> Result<LoadOrigin, LoadError> {
        self.set_loading(true);
        let result = loader.load().await;
        self.set_loading(false);
        self.apply_load(result)
    }

    /// Intègre le résultat d'un chargement
    pub fn apply_load(
        &mut self,
        result: Result<LoadOutcome, LoadError>,
    ) -> Result<LoadOrigin, LoadError> {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "Chargement des parcelles en échec");
                self.notify(Level::Error, "Erreur de chargement", err.to_string());
                return Err(err);
            }
        };

        if let Some(warning) = &outcome.warning {
            let (title, message) = match outcome.origin {
                LoadOrigin::Batched { pages } => (
                    "Chargement par lots",
                    format!("Chargement complet impossible ({warning}), parcelles chargées en {pages} lots"),
                ),
                _ => (
                    "Données de démonstration",
                    format!("Serveur indisponible ({warning}), affichage des données de démonstration"),
                ),
            };
            self.notify(Level::Warning, title, message);
        }

        self.state = PipelineState::loaded(outcome.collection);
        self.ui.show_options(self.state.options());
        self.ui.show_selection(self.state.selection());
        self.refresh(ViewportContext::WholeSet);

        info!(total = self.state.all().len(), origin = ?outcome.origin, "Collection affichée");
        Ok(outcome.origin)
    }

    /// Changement de valeur d'une liste
    pub fn on_selection_change(&mut self, dimension: Dimension, value: &str) {
        debug!(%dimension, value, "Changement de sélection");
        self.state = self.state.select(dimension, value);
        self.ui.show_selection(self.state.selection());
        self.refresh(ViewportContext::for_selection(dimension, value));
    }

    /// Vide la sélection et affiche toutes les parcelles
    pub fn reset(&mut self) {
        self.state = self.state.reset();
        self.ui.show_selection(self.state.selection());
        self.refresh(ViewportContext::WholeSet);
    }

    /// Mise en évidence d'une forme; false si la parcelle n'est pas affichée
    pub fn on_interaction(&mut self, id: &str, interaction: Interaction) -> bool {
        let Some(parcel) = self.state.filtered().get(id) else {
            debug!(id, ?interaction, "Interaction sur une parcelle non affichée");
            return false;
        };
        let style =
            style_for_land_use(parcel.attributes.land_use.as_deref()).emphasized(interaction.emphasis());
        self.map.set_shape_style(id, style);
        true
    }

    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SelectionChanged { dimension, value } => {
                self.on_selection_change(dimension, &value)
            }
            UiEvent::Reset => self.reset(),
            UiEvent::Shape { id, interaction } => {
                self.on_interaction(&id, interaction);
            }
            UiEvent::DismissNotification(id) => {
                self.dismiss(id);
            }
        }
    }

    /// Ferme une notification
    pub fn dismiss(&mut self, id: u64) -> bool {
        let dismissed = self.notifications.dismiss(id);
        if dismissed {
            self.ui.hide_notification(id);
        }
        dismissed
    }

    /// Ferme les notifications expirées à l'instant `now`
    pub fn prune_notifications(&mut self, now: Instant) {
        for id in self.notifications.prune_expired(now) {
            self.ui.hide_notification(id);
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.ui.show_busy(loading);
    }

    fn notify(&mut self, level: Level, title: &str, message: String) {
        let notification = self.notifications.notify(level, title, message);
        self.ui.show_notification(notification);
    }

    fn render(&self, parcel: &Parcel) -> RenderedFeature {
        RenderedFeature {
            id: parcel.id.clone(),
            geometry: parcel
                .geometry
                .as_ref()
                .map(|g| self.transform.transform_geometry(g)),
            style: style_for_land_use(parcel.attributes.land_use.as_deref()),
            popup: Popup::for_parcel(parcel),
            properties: parcel.properties.clone(),
        }
    }

    /// Remplace la couche, met à jour le compteur et recadre la carte
    fn refresh(&mut self, context: ViewportContext) {
        let features: Vec<RenderedFeature> =
            self.state.filtered().iter().map(|p| self.render(p)).collect();
        let count = features.len();
        let bounds = self.map.bounds(&features);

        self.map.clear_layer();
        self.map.render_layer(features);
        self.ui.show_count(&count_label(count));

        match bounds {
            Some(bounds) => self.map.fit_bounds(bounds, context.fit_options()),
            None => warn!(?context, count, "Aucune emprise à cadrer, vue inchangée"),
        }
    }
}
