//! Moteur de filtrage quartier / ilot / lot
//!
//! - `apply`: sous-ensemble des parcelles satisfaisant toutes les dimensions
//!   sélectionnées (égalité exacte, sensible à la casse)
//! - `FilterOptions::derive`: valeurs distinctes proposées pour chaque dimension,
//!   calculées sur la collection complète

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::types::{Dimension, FilterSelection, Parcel, ParcelCollection};

/// Vrai si la parcelle satisfait chaque dimension non vide de la sélection
pub fn matches(parcel: &Parcel, selection: &FilterSelection) -> bool {
    Dimension::ALL.iter().all(|&dimension| match selection.get(dimension) {
        Some(wanted) => parcel.dimension(dimension) == Some(wanted),
        None => true,
    })
}

/// Recalcule le sous-ensemble visible (ordre de `all` conservé)
pub fn apply(all: &ParcelCollection, selection: &FilterSelection) -> ParcelCollection {
    all.iter()
        .filter(|parcel| matches(parcel, selection))
        .map(Arc::clone)
        .collect()
}

/// Valeurs sélectionnables pour chaque dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub districts: Vec<String>,
    pub blocks: Vec<String>,
    pub lots: Vec<String>,
}

impl FilterOptions {
    /// Dérive les valeurs distinctes (non nulles, non vides) de la collection complète
    pub fn derive(all: &ParcelCollection) -> Self {
        let distinct = |dimension: Dimension| -> BTreeSet<String> {
            all.iter()
                .filter_map(|p| p.dimension(dimension))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        };

        Self {
            // BTreeSet: déjà en ordre lexicographique
            districts: distinct(Dimension::District).into_iter().collect(),
            blocks: sort_numeric_aware(distinct(Dimension::Block)),
            lots: sort_numeric_aware(distinct(Dimension::Lot)),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::District => &self.districts,
            Dimension::Block => &self.blocks,
            Dimension::Lot => &self.lots,
        }
    }
}

/// Compare deux valeurs: numériquement si les deux sont des entiers,
/// lexicographiquement sinon.
pub fn compare_numeric_aware(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Trie avec `compare_numeric_aware`.
///
/// La comparaison par paires n'est pas transitive sur un mélange de valeurs
/// numériques et non numériques ("9", "10", "1a"): insertion par dichotomie,
/// qui ne panique jamais et coïncide avec un tri quand l'ordre est cohérent.
pub fn sort_numeric_aware(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut sorted: Vec<String> = Vec::new();
    for value in values {
        let pos = sorted.partition_point(|existing| {
            compare_numeric_aware(existing, &value) != Ordering::Greater
        });
        sorted.insert(pos, value);
    }
    sorted
}
