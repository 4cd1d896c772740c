//! Tests d'intégration du pipeline complet: chargement, filtrage, rendu
//!
//! La carte et l'interface sont remplacées par des surfaces qui enregistrent
//! les appels reçus.

use async_trait::async_trait;
use bytes::Bytes;
use geo::Rect;
use parcelles::fallback::{fallback_collection, FALLBACK_GEOJSON};
use parcelles::filter::FilterOptions;
use parcelles::view::notify::{Level, Notification};
use parcelles::view::style::{Interaction, ShapeStyle};
use parcelles::view::viewport::FitOptions;
use parcelles::{
    AttributeKeys, Dimension, FeatureRequest, FeatureSource, FilterSelection, LoadError,
    LoadOrigin, Loader, MapSurface, RenderedFeature, UiEvent, ViewController, ViewSurface,
};

#[derive(Default)]
struct RecordingMap {
    layer: Vec<RenderedFeature>,
    clears: usize,
    fits: Vec<(Rect<f64>, FitOptions)>,
    styles: Vec<(String, ShapeStyle)>,
}

impl MapSurface for RecordingMap {
    fn clear_layer(&mut self) {
        self.clears += 1;
        self.layer.clear();
    }

    fn render_layer(&mut self, features: Vec<RenderedFeature>) {
        self.layer = features;
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitOptions) {
        self.fits.push((bounds, options));
    }

    fn set_shape_style(&mut self, id: &str, style: ShapeStyle) {
        self.styles.push((id.to_string(), style));
    }
}

#[derive(Default)]
struct RecordingUi {
    options: Option<FilterOptions>,
    selection: FilterSelection,
    counts: Vec<String>,
    busy: Vec<bool>,
    shown: Vec<Notification>,
    hidden: Vec<u64>,
}

impl ViewSurface for RecordingUi {
    fn show_options(&mut self, options: &FilterOptions) {
        self.options = Some(options.clone());
    }

    fn show_selection(&mut self, selection: &FilterSelection) {
        self.selection = selection.clone();
    }

    fn show_count(&mut self, label: &str) {
        self.counts.push(label.to_string());
    }

    fn show_busy(&mut self, busy: bool) {
        self.busy.push(busy);
    }

    fn show_notification(&mut self, notification: &Notification) {
        self.shown.push(notification.clone());
    }

    fn hide_notification(&mut self, id: u64) {
        self.hidden.push(id);
    }
}

/// Source qui sert toujours le même résultat
struct StaticSource(Result<&'static str, u16>);

#[async_trait]
impl FeatureSource for StaticSource {
    async fn fetch(&self, _request: FeatureRequest) -> Result<Bytes, LoadError> {
        match self.0 {
            Ok(body) => Ok(Bytes::from_static(body.as_bytes())),
            Err(status) => Err(LoadError::Status {
                status,
                reason: "Internal Server Error".into(),
            }),
        }
    }
}

type Controller = ViewController<RecordingMap, RecordingUi>;

async fn loaded_controller() -> Controller {
    let loader = Loader::new(StaticSource(Ok(FALLBACK_GEOJSON)));
    let mut controller = ViewController::new(RecordingMap::default(), RecordingUi::default());
    let origin = controller.reload(&loader).await.unwrap();
    assert_eq!(origin, LoadOrigin::Primary);
    controller
}

#[tokio::test]
async fn test_load_renders_everything() {
    let controller = loaded_controller().await;

    assert!(!controller.is_loading());
    assert_eq!(controller.ui().busy, vec![true, false]);
    assert_eq!(controller.map().layer.len(), 3);
    assert_eq!(controller.ui().counts.last().unwrap(), "3 parcelles affichées");
    assert_eq!(
        controller.map().fits.last().unwrap().1,
        FitOptions { padding_px: 20, max_zoom: 16 }
    );

    let options = controller.ui().options.as_ref().unwrap();
    assert_eq!(options.districts, vec!["AHOUABO", "EBIMPE", "THOMASSET"]);
    assert_eq!(options.lots, vec!["46", "3456", "47196"]);

    // Rendu en coordonnées géographiques
    let bounds = controller.map().fits[0].0;
    assert!(bounds.min().x > -4.2 && bounds.max().x < -3.9);
    assert!(bounds.min().y > 5.3 && bounds.max().y < 5.7);
}

#[tokio::test]
async fn test_selection_fits_with_dimension_context() {
    let mut controller = loaded_controller().await;

    controller.on_selection_change(Dimension::District, "AHOUABO");
    assert_eq!(controller.map().layer.len(), 1);
    assert_eq!(controller.map().layer[0].id, "parcelle_anyama.26244");
    assert_eq!(
        controller.map().fits.last().unwrap().1,
        FitOptions { padding_px: 15, max_zoom: 15 }
    );

    controller.on_selection_change(Dimension::Block, "11");
    assert_eq!(
        controller.map().fits.last().unwrap().1,
        FitOptions { padding_px: 12, max_zoom: 17 }
    );

    controller.on_selection_change(Dimension::Lot, "47196");
    assert_eq!(
        controller.map().fits.last().unwrap().1,
        FitOptions { padding_px: 10, max_zoom: 18 }
    );
    assert_eq!(controller.ui().selection.lot.as_deref(), Some("47196"));

    // Valeur vidée: cadrage sur l'ensemble visible
    controller.on_selection_change(Dimension::Lot, "");
    assert_eq!(
        controller.map().fits.last().unwrap().1,
        FitOptions { padding_px: 20, max_zoom: 16 }
    );
}

#[tokio::test]
async fn test_empty_subset_leaves_viewport() {
    let mut controller = loaded_controller().await;
    let fits_before = controller.map().fits.len();
    let clears_before = controller.map().clears;

    controller.on_selection_change(Dimension::District, "EBIMPE");
    controller.on_selection_change(Dimension::Block, "11");

    assert!(controller.state().filtered().is_empty());
    assert!(controller.map().layer.is_empty());
    assert_eq!(controller.map().clears, clears_before + 2);
    assert_eq!(controller.ui().counts.last().unwrap(), "0 parcelles affichées");
    assert_eq!(controller.map().fits.len(), fits_before + 1);

    // Les listes ne sont pas réduites par le filtre
    assert_eq!(controller.state().options().districts.len(), 3);
}

#[tokio::test]
async fn test_reset_through_events() {
    let mut controller = loaded_controller().await;

    controller.handle(UiEvent::SelectionChanged {
        dimension: Dimension::District,
        value: "THOMASSET".into(),
    });
    assert_eq!(controller.state().filtered().len(), 1);

    controller.handle(UiEvent::Reset);
    assert_eq!(controller.state().filtered(), controller.state().all());
    assert!(controller.ui().selection.is_empty());
    assert_eq!(controller.map().layer.len(), 3);
    assert_eq!(controller.ui().counts.last().unwrap(), "3 parcelles affichées");
}

#[tokio::test]
async fn test_interaction_only_changes_style() {
    let mut controller = loaded_controller().await;
    controller.on_selection_change(Dimension::District, "AHOUABO");
    let filtered = controller.state().filtered().clone();

    controller.handle(UiEvent::Shape {
        id: "parcelle_anyama.26244".into(),
        interaction: Interaction::Hover,
    });
    controller.handle(UiEvent::Shape {
        id: "parcelle_anyama.185".into(),
        interaction: Interaction::Click,
    });

    let styles = &controller.map().styles;
    assert_eq!(styles.len(), 1);
    assert_eq!(styles[0].0, "parcelle_anyama.26244");
    assert_eq!(styles[0].1.weight, 3.0);
    assert_eq!(styles[0].1.fill_color, "#f39c12");
    assert_eq!(controller.state().filtered(), &filtered);
}

#[tokio::test]
async fn test_server_error_uses_fallback_with_warning() {
    let loader = Loader::new(StaticSource(Err(500)));
    let mut controller = ViewController::new(RecordingMap::default(), RecordingUi::default());

    let origin = controller.reload(&loader).await.unwrap();
    assert_eq!(origin, LoadOrigin::Fallback);
    assert_eq!(
        controller.state().all(),
        &fallback_collection(&AttributeKeys::default()).unwrap()
    );

    let notifications = controller.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, Level::Warning);
    assert_eq!(controller.ui().shown.len(), 1);

    let id = notifications[0].id;
    controller.handle(UiEvent::DismissNotification(id));
    assert!(controller.notifications().is_empty());
    assert_eq!(controller.ui().hidden, vec![id]);
}

#[tokio::test]
async fn test_batch_failure_keeps_previous_collection() {
    let mut controller = loaded_controller().await;
    let previous = controller.state().all().clone();

    let failure = Err(LoadError::Batch {
        page: 2,
        source: Box::new(LoadError::transport("connection reset")),
    });
    assert!(controller.apply_load(failure).is_err());

    assert_eq!(controller.state().all(), &previous);
    assert_eq!(controller.notifications()[0].level, Level::Error);
}

fn projected_feature(i: usize, geometry: &str) -> String {
    format!(
        r#"{{"type":"Feature","id":"parcelle_anyama.{i}","geometry":{geometry},"properties":{{"quartiers":"Q{}","ilot":"1","lot":"{i}","nature_lot":"Bâti"}}}}"#,
        i % 2
    )
}

const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[385000,610000],[385010,610000],[385010,610010],[385000,610000]]]}"#;

/// Source qui refuse la requête complète (413) et sert `total` parcelles par pages
struct TooLargeSource {
    total: usize,
}

#[async_trait]
impl FeatureSource for TooLargeSource {
    async fn fetch(&self, request: FeatureRequest) -> Result<Bytes, LoadError> {
        let Some(page) = request.page else {
            return Err(LoadError::Status {
                status: 413,
                reason: "Payload Too Large".into(),
            });
        };
        let start = page.start_index.min(self.total);
        let end = (page.start_index + page.max_features).min(self.total);
        let features: Vec<String> = (start..end).map(|i| projected_feature(i, SQUARE)).collect();
        Ok(Bytes::from(format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        )))
    }
}

#[tokio::test]
async fn test_batched_recovery_shows_warning() {
    let loader = Loader::new(TooLargeSource { total: 5 }).with_page_size(2);
    let mut controller = ViewController::new(RecordingMap::default(), RecordingUi::default());

    let origin = controller.reload(&loader).await.unwrap();
    assert_eq!(origin, LoadOrigin::Batched { pages: 3 });
    assert_eq!(controller.map().layer.len(), 5);

    let notifications = controller.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, Level::Warning);
    assert_eq!(notifications[0].title, "Chargement par lots");
    assert!(notifications[0].message.contains("413"));
    assert!(notifications[0].message.contains("3 lots"));
    assert_eq!(controller.ui().shown.len(), 1);
}

#[tokio::test]
async fn test_viewport_ignores_point_geometries() {
    let body = format!(
        r#"{{"type":"FeatureCollection","features":[{},{}]}}"#,
        projected_feature(0, r#"{"type":"Point","coordinates":[385005,610005]}"#),
        projected_feature(1, SQUARE),
    );
    let body: &'static str = Box::leak(body.into_boxed_str());
    let loader = Loader::new(StaticSource(Ok(body)));
    let mut controller = ViewController::new(RecordingMap::default(), RecordingUi::default());

    controller.reload(&loader).await.unwrap();
    assert_eq!(controller.map().layer.len(), 2);

    let (bounds, _) = controller.map().fits[0];
    assert!(bounds.max().x < 0.0);
    assert!(bounds.min().x > -4.2);

    // Seul le point reste: pas de cadrage
    controller.on_selection_change(Dimension::District, "Q0");
    assert_eq!(controller.map().layer.len(), 1);
    assert_eq!(controller.map().fits.len(), 1);
}
