//! Interface console: les mises à jour de l'interface sont journalisées

use tracing::{debug, error, info, warn};

use parcelles::filter::FilterOptions;
use parcelles::view::notify::{Level, Notification};
use parcelles::{FilterSelection, ViewSurface};

#[derive(Debug, Default)]
pub struct ConsoleView {
    count: String,
}

impl ConsoleView {
    /// Dernier libellé de compteur affiché
    pub fn count(&self) -> &str {
        &self.count
    }
}

impl ViewSurface for ConsoleView {
    fn show_options(&mut self, options: &FilterOptions) {
        info!(
            districts = options.districts.len(),
            blocks = options.blocks.len(),
            lots = options.lots.len(),
            "Listes de filtres mises à jour"
        );
    }

    fn show_selection(&mut self, selection: &FilterSelection) {
        debug!(
            district = selection.district.as_deref().unwrap_or(""),
            block = selection.block.as_deref().unwrap_or(""),
            lot = selection.lot.as_deref().unwrap_or(""),
            "Sélection"
        );
    }

    fn show_count(&mut self, label: &str) {
        info!("{label}");
        self.count = label.to_string();
    }

    fn show_busy(&mut self, busy: bool) {
        debug!(busy, "Chargement");
    }

    fn show_notification(&mut self, notification: &Notification) {
        match notification.level {
            Level::Warning => {
                warn!(id = notification.id, "{}: {}", notification.title, notification.message)
            }
            Level::Error => {
                error!(id = notification.id, "{}: {}", notification.title, notification.message)
            }
        }
    }

    fn hide_notification(&mut self, id: u64) {
        debug!(id, "Notification fermée");
    }
}
