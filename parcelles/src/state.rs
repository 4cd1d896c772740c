//! État du pipeline: collection complète, sous-ensemble visible, sélection

use serde::Serialize;

use crate::filter::{self, FilterOptions};
use crate::types::{Dimension, FilterSelection, ParcelCollection};

/// État possédé par le contrôleur de vue.
///
/// Chaque étape le produit ou le transforme explicitement: le chargeur crée
/// `all`, le filtre recalcule `filtered` à partir de `all` et de la sélection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    all: ParcelCollection,
    filtered: ParcelCollection,
    selection: FilterSelection,
    options: FilterOptions,
}

impl PipelineState {
    /// État initial après chargement: pas de sélection, `filtered == all`
    pub fn loaded(all: ParcelCollection) -> Self {
        let options = FilterOptions::derive(&all);
        Self {
            filtered: all.clone(),
            all,
            selection: FilterSelection::default(),
            options,
        }
    }

    /// Nouvel état pour une sélection donnée (les options ne changent pas)
    pub fn with_selection(&self, selection: FilterSelection) -> Self {
        Self {
            all: self.all.clone(),
            filtered: filter::apply(&self.all, &selection),
            selection,
            options: self.options.clone(),
        }
    }

    /// Modifie une seule dimension
    pub fn select(&self, dimension: Dimension, value: &str) -> Self {
        self.with_selection(self.selection.clone().with(dimension, value))
    }

    /// Sélection vide, `filtered == all`
    pub fn reset(&self) -> Self {
        self.with_selection(FilterSelection::default())
    }

    pub fn all(&self) -> &ParcelCollection {
        &self.all
    }

    pub fn filtered(&self) -> &ParcelCollection {
        &self.filtered
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Résumé sérialisable (rapports)
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            total: self.all.len(),
            visible: self.filtered.len(),
            selection: self.selection.clone(),
            districts: self.options.districts.len(),
            blocks: self.options.blocks.len(),
            lots: self.options.lots.len(),
        }
    }
}

/// Compteurs de l'état courant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub total: usize,
    pub visible: usize,
    pub selection: FilterSelection,
    pub districts: usize,
    pub blocks: usize,
    pub lots: usize,
}
